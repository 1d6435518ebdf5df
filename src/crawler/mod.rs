//! Crawler module for mirroring the archive
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching and the private-archive login
//! - Parsing of the month index and date views
//! - Pacing between message fetches
//! - Overall run coordination

mod coordinator;
mod fetcher;
mod parser;
mod throttle;

pub use coordinator::{Coordinator, CrawlReport};
pub use fetcher::{build_http_client, build_raw_client, PageFetcher};
pub use parser::{parse_message_links, parse_month_index, MonthArchive};
pub use throttle::Throttle;

use crate::config::ArchiveConfig;
use crate::MirrorError;

/// Runs a complete mirror
///
/// This is the main entry point for a run. It will:
/// 1. Log in if the archive is private
/// 2. Mirror the top-level index
/// 3. Walk the months newest first, mirroring each message
/// 4. Publish the feed
///
/// # Returns
///
/// * `Ok(CrawlReport)` - The run finished
/// * `Err(MirrorError)` - A fatal fetch, login or write error aborted the run
pub async fn mirror(config: ArchiveConfig) -> Result<CrawlReport, MirrorError> {
    Coordinator::new(config)?.run().await
}

/// Downloads the monthly gzipped text archives only
pub async fn mirror_text_archives(config: ArchiveConfig) -> Result<CrawlReport, MirrorError> {
    Coordinator::new(config)?.run_text_archives().await
}
