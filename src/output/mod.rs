//! Output module for the RSS feed
//!
//! This module handles:
//! - Projecting mirrored messages into feed items
//! - Truncating summaries on word boundaries
//! - Serializing and publishing the feed file

mod feed;
mod truncate;

pub use feed::{FeedBuilder, FeedItem};
pub use truncate::{smart_truncate, ELLIPSIS, SUMMARY_LENGTH};
