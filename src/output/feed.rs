//! RSS feed of recently mirrored messages
//!
//! Items are kept in the order they are appended, and only the first
//! `items-for-rss` appended items are kept. The crawler appends newest first.

use crate::config::ArchiveConfig;
use crate::extract::MessagePage;
use crate::output::truncate::{smart_truncate, SUMMARY_LENGTH};
use crate::url::publish_link;
use crate::MirrorError;
use chrono::{DateTime, Utc};
use rss::{Channel, Guid, Item};
use std::collections::BTreeMap;
use std::path::PathBuf;

const CONTENT_NAMESPACE: &str = "http://purl.org/rss/1.0/modules/content/";

/// One message as it appears in the feed
#[derive(Debug, Clone, PartialEq)]
pub struct FeedItem {
    /// `sender > subject`, or just the subject when the sender is unknown
    pub title: String,

    /// Public URL of the mirrored page
    pub link: String,

    /// Plain-text body truncated on a word boundary
    pub summary: String,

    pub published: DateTime<Utc>,

    /// Full HTML body, published as `content:encoded`
    pub content: String,
}

impl FeedItem {
    /// Projects a mirrored message into feed form
    ///
    /// The link points at the page's local path under `publish_url`.
    pub fn from_page(page: &MessagePage, publish_url: &str) -> Self {
        let fields = &page.fields;
        let title = match &fields.sender {
            Some(sender) => format!("{} > {}", sender, fields.subject),
            None => fields.subject.clone(),
        };

        Self {
            title,
            link: publish_link(publish_url, &page.local_path),
            summary: smart_truncate(&fields.body_text, SUMMARY_LENGTH),
            published: fields.sent_at,
            content: fields.body_html.clone(),
        }
    }

    fn to_rss_item(&self) -> Item {
        let mut guid = Guid::default();
        guid.set_value(self.link.clone());
        guid.set_permalink(true);

        let mut item = Item::default();
        item.set_title(self.title.clone());
        item.set_link(self.link.clone());
        item.set_description(self.summary.clone());
        item.set_pub_date(self.published.to_rfc2822());
        item.set_guid(guid);
        item.set_content(self.content.clone());
        item
    }
}

/// Channel settings for an enabled feed
#[derive(Debug, Clone)]
struct FeedSettings {
    title: String,
    link: String,
    description: String,
    path: PathBuf,
}

/// Accumulates feed items for one run and serializes them
///
/// When no feed file is configured every operation is a no-op.
#[derive(Debug, Clone)]
pub struct FeedBuilder {
    settings: Option<FeedSettings>,
    cap: usize,
    items: Vec<FeedItem>,
}

impl FeedBuilder {
    /// Creates a builder from the run configuration
    ///
    /// The channel links to the configured list-info page, falling back to the
    /// publish URL.
    pub fn new(config: &ArchiveConfig) -> Self {
        let settings = config.feed_enabled().then(|| FeedSettings {
            title: config.rss.rss_title.clone(),
            link: if config.conversion.list_info_url.is_empty() {
                config.local.publish_url.clone()
            } else {
                config.conversion.list_info_url.clone()
            },
            description: config.rss.rss_description.clone(),
            path: PathBuf::from(&config.rss.rss_file),
        });

        Self {
            settings,
            cap: config.rss.items_for_rss,
            items: Vec::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.settings.is_some()
    }

    /// True once the item cap has been reached
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.cap
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[FeedItem] {
        &self.items
    }

    /// Adds an item unless the feed is disabled or full
    ///
    /// Returns whether the item was added.
    pub fn append(&mut self, item: FeedItem) -> bool {
        if !self.is_enabled() || self.is_full() {
            return false;
        }
        tracing::debug!("Adding feed item: {}", item.title);
        self.items.push(item);
        true
    }

    /// Serializes the feed, or returns None when the feed is disabled
    pub fn finalize(&self) -> Result<Option<String>, MirrorError> {
        let Some(settings) = &self.settings else {
            return Ok(None);
        };

        let mut namespaces = BTreeMap::new();
        namespaces.insert("content".to_string(), CONTENT_NAMESPACE.to_string());

        let mut channel = Channel::default();
        channel.set_title(settings.title.clone());
        channel.set_link(settings.link.clone());
        channel.set_description(settings.description.clone());
        channel.set_last_build_date(Utc::now().to_rfc2822());
        channel.set_namespaces(namespaces);
        channel.set_items(self.items.iter().map(FeedItem::to_rss_item).collect::<Vec<_>>());

        let buffer = channel.write_to(Vec::new())?;
        Ok(Some(String::from_utf8_lossy(&buffer).into_owned()))
    }

    /// Writes the feed to its configured path
    ///
    /// # Returns
    ///
    /// * `Ok(Some(path))` - The feed was written
    /// * `Ok(None)` - The feed is disabled
    /// * `Err(MirrorError)` - Serialization or writing failed
    pub fn publish(&self) -> Result<Option<PathBuf>, MirrorError> {
        let Some(document) = self.finalize()? else {
            return Ok(None);
        };
        let Some(settings) = &self.settings else {
            return Ok(None);
        };

        if let Some(parent) = settings.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&settings.path, document)?;

        tracing::info!(
            "Wrote feed with {} items to {}",
            self.items.len(),
            settings.path.display()
        );
        Ok(Some(settings.path.clone()))
    }
}
