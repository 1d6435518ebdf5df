//! Message extraction from filtered message pages
//!
//! This module reads the subject, sender, sent date and body from a mirrored
//! message page using a [`PageSchema`], and derives the plain-text and HTML
//! renderings used in the feed.

mod date;
mod schema;

pub use date::parse_sent_date;
pub use schema::PageSchema;

use crate::storage::{PageStore, StorageResult};
use chrono::{DateTime, Utc};
use regex::Regex;
use scraper::{ElementRef, Html};
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

/// Errors that can occur while reading a message page
///
/// These are recoverable: the page is still mirrored, it just cannot be
/// described in the feed.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Missing {0}")]
    MissingElement(&'static str),

    #[error("Unparseable sent date: '{0}'")]
    UnparseableDate(String),

    #[error("Invalid locator {0}")]
    InvalidLocator(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Fields read from a message page
#[derive(Debug, Clone, PartialEq)]
pub struct MessageFields {
    /// Subject with any leading `[list-name] ` tag removed
    pub subject: String,

    /// Sender display name, if the page still shows one after filtering
    pub sender: Option<String>,

    pub sent_at: DateTime<Utc>,

    /// Body as plain text, prefixed with `From: <sender>. ` when known
    pub body_text: String,

    /// Body as HTML with line breaks, prefixed with a From/Subject/Date block
    /// when the sender is known
    pub body_html: String,
}

impl MessageFields {
    /// Hours elapsed between sending and `now`
    pub fn age_hours(&self, now: DateTime<Utc>) -> f64 {
        (now - self.sent_at).num_seconds() as f64 / 3600.0
    }
}

/// A mirrored message page
#[derive(Debug, Clone)]
pub struct MessagePage {
    pub remote_url: Url,

    /// Path relative to the publish directory, e.g. `2009-February/000042.html`
    pub local_path: String,

    /// The page as written to disk
    pub filtered_html: String,

    pub fields: MessageFields,
}

impl MessagePage {
    /// Writes the filtered page at its local path
    pub fn save(&self, store: &dyn PageStore) -> StorageResult<PathBuf> {
        store.save(&self.local_path, self.filtered_html.as_bytes())
    }
}

/// Reads message fields from filtered pages
pub struct MessageExtractor {
    schema: PageSchema,
    subject_prefix: Regex,
}

impl MessageExtractor {
    /// An extractor for the standard pipermail message layout
    pub fn new() -> Result<Self, ExtractionError> {
        Self::with_schema(PageSchema::pipermail()?)
    }

    pub fn with_schema(schema: PageSchema) -> Result<Self, ExtractionError> {
        Ok(Self {
            schema,
            subject_prefix: Regex::new(r"^(?:\[.*?\]\s+)?")?,
        })
    }

    /// Extracts message fields from a filtered message page
    ///
    /// # Returns
    ///
    /// * `Ok(MessageFields)` - The page had a heading, a parseable date and a body
    /// * `Err(ExtractionError)` - A required element is absent or unreadable
    pub fn extract(&self, html: &str) -> Result<MessageFields, ExtractionError> {
        let document = Html::parse_document(html);

        let heading = document
            .select(&self.schema.subject)
            .next()
            .ok_or(ExtractionError::MissingElement("subject heading"))?;
        let heading_text = element_text(heading);
        let subject = self
            .subject_prefix
            .replace(heading_text.trim(), "")
            .trim()
            .to_string();

        let sender = document
            .select(&self.schema.sender)
            .next()
            .map(|e| element_text(e).trim().to_string())
            .filter(|s| !s.is_empty());

        let sent_text = document
            .select(&self.schema.sent)
            .next()
            .map(element_text)
            .ok_or(ExtractionError::MissingElement("sent date"))?;
        let sent_at = parse_sent_date(&sent_text)
            .ok_or_else(|| ExtractionError::UnparseableDate(sent_text.trim().to_string()))?;

        let body = document
            .select(&self.schema.body)
            .next()
            .map(element_text)
            .ok_or(ExtractionError::MissingElement("message body"))?;

        let body_lines = escape_html(&body).replace('\n', "<br />\n");

        let (body_text, body_html) = match &sender {
            Some(sender) => (
                format!("From: {}. {}", sender, body),
                format!(
                    "\n<div class=\"email-meta\">\n    <strong>From:</strong> {}<br />\n    <strong>Subject:</strong> {}<br />\n    <strong>Date:</strong> {}\n</div><br />\n{}\n",
                    escape_html(sender),
                    escape_html(&subject),
                    sent_at.format("%d %B %Y, %H:%M"),
                    body_lines
                ),
            ),
            None => (body, body_lines),
        };

        Ok(MessageFields {
            subject,
            sender,
            sent_at,
            body_text,
            body_html,
        })
    }
}

/// Concatenates every text node under an element
fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Escapes text for inclusion in HTML
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
