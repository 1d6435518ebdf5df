//! Archive URL layout
//!
//! Pipermail publishes a list at a fixed set of paths; this module builds them
//! from the Mailman configuration.

use crate::config::MailmanConfig;
use crate::{UrlError, UrlResult};
use url::Url;

/// Remote locations of one list's archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveUrls {
    list_url: String,
    list_info_url: String,
}

impl ArchiveUrls {
    /// Builds the archive locations for a list
    ///
    /// Private lists live under `/mailman/private/<list>`, public ones under
    /// `/pipermail/<list>`.
    pub fn new(config: &MailmanConfig, private: bool) -> UrlResult<Self> {
        let site = format!("{}://{}", config.protocol, config.domain);
        let list_url = if private {
            format!("{}/mailman/private/{}", site, config.list_name)
        } else {
            format!("{}/pipermail/{}", site, config.list_name)
        };
        let list_info_url = format!("{}/mailman/listinfo/{}", site, config.list_name);

        Url::parse(&list_url).map_err(|e| UrlError::Parse(format!("{}: {}", list_url, e)))?;

        Ok(Self {
            list_url,
            list_info_url,
        })
    }

    /// The top-level archive index, e.g. `http://host/pipermail/list`
    pub fn list_url(&self) -> &str {
        &self.list_url
    }

    /// The list's public information page on the source site
    pub fn list_info_url(&self) -> &str {
        &self.list_info_url
    }

    /// A month's directory, e.g. `http://host/pipermail/list/2009-February`
    pub fn month_url(&self, month: &str) -> String {
        format!("{}/{}", self.list_url, month)
    }

    /// A file inside a month's directory
    pub fn month_file_url(&self, month: &str, file_name: &str) -> String {
        format!("{}/{}/{}", self.list_url, month, file_name)
    }

    /// A file next to the top-level index, e.g. a month's `.txt.gz`
    pub fn list_file_url(&self, file_name: &str) -> String {
        format!("{}/{}", self.list_url, file_name)
    }

    /// Resolves a link found on a month's index page
    pub fn resolve_in_month(&self, month: &str, href: &str) -> UrlResult<Url> {
        let base = format!("{}/", self.month_url(month));
        let base = Url::parse(&base).map_err(|e| UrlError::Parse(format!("{}: {}", base, e)))?;
        base.join(href)
            .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))
    }
}

/// Returns the last path segment of a URL, e.g. `000042.html`
pub fn file_name(url: &Url) -> UrlResult<String> {
    url.path_segments()
        .and_then(|segments| segments.last())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(|| UrlError::MissingFileName(url.to_string()))
}

/// Builds the public URL of a mirrored file from the configured publish URL
pub fn publish_link(publish_url: &str, relative_path: &str) -> String {
    format!(
        "{}/{}",
        publish_url.trim_end_matches('/'),
        relative_path.trim_start_matches('/')
    )
}
