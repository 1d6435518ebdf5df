use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Raw configuration file layout for Mailman-Mirror
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub mailman: MailmanConfig,
    #[serde(default)]
    pub conversion: ConversionConfig,
    #[serde(default)]
    pub rss: RssConfig,
    pub local: LocalConfig,
}

/// The Mailman installation and list being mirrored
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MailmanConfig {
    /// Subscriber address used to log in; empty for public archives
    #[serde(default)]
    pub email: String,

    /// Subscriber password for private archives
    #[serde(default)]
    pub password: String,

    /// Host (and optional port) of the Mailman installation
    pub domain: String,

    /// URL scheme, "http" or "https"
    #[serde(default = "default_protocol")]
    pub protocol: String,

    /// Name of the list, as it appears in archive URLs
    pub list_name: String,

    /// User agent sent with every request
    #[serde(default)]
    pub user_agent: Option<String>,
}

/// Rewriting rules applied to every mirrored page
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConversionConfig {
    #[serde(default)]
    pub filter_email_addresses: bool,

    /// Replacement for links to the list's own listinfo page
    #[serde(default)]
    pub list_info_url: String,

    /// Quote depth to keep; deeper quoted lines are removed. 0 keeps everything.
    #[serde(default)]
    pub strip_quotes: u32,

    /// Path to an HTML fragment inserted before `</head>`
    #[serde(default)]
    pub head_html: String,

    /// Newline-separated `pattern//replacement` pairs
    #[serde(default)]
    pub search_replace: String,
}

/// Feed settings; an empty `rss-file` disables the feed
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RssConfig {
    #[serde(default)]
    pub rss_file: String,

    #[serde(default = "default_items_for_rss")]
    pub items_for_rss: usize,

    #[serde(default)]
    pub rss_title: String,

    #[serde(default)]
    pub rss_description: String,
}

impl Default for RssConfig {
    fn default() -> Self {
        Self {
            rss_file: String::new(),
            items_for_rss: default_items_for_rss(),
            rss_title: String::new(),
            rss_description: String::new(),
        }
    }
}

/// Where the mirror is written and published
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LocalConfig {
    pub publish_dir: PathBuf,

    /// Public base URL of `publish-dir`, used for feed links
    pub publish_url: String,

    /// Look-back window in hours; 0 means unbounded
    #[serde(default)]
    pub hours_to_go_back: u64,

    #[serde(default)]
    pub verbose: bool,

    /// Pause between message fetches (milliseconds)
    #[serde(default = "default_message_delay_ms")]
    pub message_delay_ms: u64,
}

/// One custom search/replace rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchReplace {
    pub pattern: String,
    pub replacement: String,
}

/// Fully resolved, immutable run configuration
///
/// Built once by the loader and passed by reference to every component.
#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    pub mailman: MailmanConfig,
    pub conversion: ConversionConfig,
    pub rss: RssConfig,
    pub local: LocalConfig,

    /// Contents of the `head-html` file, if one was configured
    pub head_html: Option<String>,

    /// Parsed `search-replace` rules, in configured order
    pub search_replace: Vec<SearchReplace>,
}

impl ArchiveConfig {
    /// Private archives need a login before anything can be fetched
    pub fn is_private(&self) -> bool {
        !self.mailman.email.is_empty()
    }

    pub fn feed_enabled(&self) -> bool {
        !self.rss.rss_file.is_empty()
    }

    /// The look-back window, or None when unbounded
    pub fn look_back_hours(&self) -> Option<u64> {
        match self.local.hours_to_go_back {
            0 => None,
            hours => Some(hours),
        }
    }

    pub fn message_delay(&self) -> Duration {
        Duration::from_millis(self.local.message_delay_ms)
    }

    pub fn user_agent(&self) -> String {
        self.mailman
            .user_agent
            .clone()
            .unwrap_or_else(|| format!("mailman-mirror/{}", env!("CARGO_PKG_VERSION")))
    }
}

fn default_protocol() -> String {
    "http".to_string()
}

fn default_items_for_rss() -> usize {
    10
}

fn default_message_delay_ms() -> u64 {
    500
}
