//! Crawler coordinator - main mirror orchestration logic
//!
//! This module contains the crawl loop that coordinates a run:
//! - Logging in to private archives
//! - Mirroring the top-level index and every month's date view, newest first
//! - Mirroring each message and feeding it to the RSS builder
//! - Deciding when older messages are no longer needed
//! - Refreshing a month's auxiliary views when it had new messages

use crate::config::ArchiveConfig;
use crate::crawler::parser::{parse_message_links, parse_month_index, MonthArchive};
use crate::crawler::{PageFetcher, Throttle};
use crate::extract::{MessageExtractor, MessagePage};
use crate::filter::ContentFilter;
use crate::output::{FeedBuilder, FeedItem};
use crate::state::{CrawlCursor, CrawlState};
use crate::storage::{FsPageStore, PageStore};
use crate::url::{file_name, ArchiveUrls};
use crate::MirrorError;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use url::Url;

/// Month views refreshed alongside `date.html`
const AUXILIARY_VIEWS: [&str; 3] = ["thread", "subject", "author"];

/// Summary of a finished run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlReport {
    /// Months whose date view was mirrored
    pub months_visited: usize,

    pub messages_fetched: usize,

    pub feed_items: usize,

    /// True if the look-back window ended the run before the oldest month
    pub stopped_early: bool,

    /// Where the feed was written, if it is enabled
    pub feed_path: Option<PathBuf>,

    /// Monthly text archives saved by a text-only run
    pub archives_saved: usize,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<ArchiveConfig>,
    urls: ArchiveUrls,
    fetcher: PageFetcher,
    filter: ContentFilter,
    extractor: MessageExtractor,
    store: Box<dyn PageStore>,
    feed: FeedBuilder,
    cursor: CrawlCursor,
    throttle: Throttle,
    state: CrawlState,
}

impl Coordinator {
    /// Creates a coordinator that mirrors into the configured publish directory
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(MirrorError)` - A derived URL, filter rule or the HTTP client was invalid
    pub fn new(config: ArchiveConfig) -> Result<Self, MirrorError> {
        let store = FsPageStore::new(config.local.publish_dir.clone());
        Self::with_store(config, Box::new(store))
    }

    /// Creates a coordinator that mirrors into the given page store
    pub fn with_store(
        config: ArchiveConfig,
        store: Box<dyn PageStore>,
    ) -> Result<Self, MirrorError> {
        let urls = ArchiveUrls::new(&config.mailman, config.is_private())?;
        let filter = ContentFilter::new(&config, &urls)?;
        let extractor = MessageExtractor::new()?;
        let fetcher = PageFetcher::new(&config.user_agent())?;
        let feed = FeedBuilder::new(&config);
        let throttle = Throttle::new(config.message_delay());

        Ok(Self {
            config: Arc::new(config),
            urls,
            fetcher,
            filter,
            extractor,
            store,
            feed,
            cursor: CrawlCursor::new(),
            throttle,
            state: CrawlState::Init,
        })
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    pub fn urls(&self) -> &ArchiveUrls {
        &self.urls
    }

    /// Mirrors the archive and publishes the feed
    ///
    /// Months are visited newest first. The walk ends after the oldest month,
    /// or as soon as the feed is full and a message older than the look-back
    /// window turns up. Any fetch or write failure aborts the run; pages already
    /// written stay on disk.
    pub async fn run(&mut self) -> Result<CrawlReport, MirrorError> {
        tracing::info!(
            "Mirroring {} into {}",
            self.urls.list_url(),
            self.store.root().display()
        );

        self.login_if_private().await?;
        self.transition(CrawlState::ListingIndex)?;

        let list_url = self.urls.list_url().to_string();
        let index = self.mirror_page(&list_url, "index.html").await?;
        let months = parse_month_index(&index);
        tracing::info!("Archive lists {} months", months.len());

        let mut months_visited = 0;
        for month in &months {
            self.crawl_month(month).await?;
            months_visited += 1;

            if !self.cursor.keep_going() {
                break;
            }
        }

        self.transition(CrawlState::Done)?;
        let feed_path = self.feed.publish()?;

        let report = CrawlReport {
            months_visited,
            messages_fetched: self.cursor.messages_fetched,
            feed_items: self.feed.len(),
            stopped_early: !self.cursor.keep_going(),
            feed_path,
            archives_saved: 0,
        };
        tracing::info!(
            "Run complete: {} months, {} messages, {} feed items{}",
            report.months_visited,
            report.messages_fetched,
            report.feed_items,
            if report.stopped_early {
                " (stopped at look-back window)"
            } else {
                ""
            }
        );
        Ok(report)
    }

    /// Downloads every month's gzipped text archive into `text/`
    ///
    /// Nothing is filtered and no feed is written.
    pub async fn run_text_archives(&mut self) -> Result<CrawlReport, MirrorError> {
        self.login_if_private().await?;
        self.transition(CrawlState::ListingIndex)?;

        let index = self.fetcher.fetch_text(self.urls.list_url()).await?;
        let months = parse_month_index(&index);
        self.transition(CrawlState::WalkingMonths)?;

        let mut archives_saved = 0;
        for month in &months {
            let Some(archive) = &month.text_archive else {
                tracing::debug!("{} has no text archive", month.name);
                continue;
            };

            let bytes = self
                .fetcher
                .fetch_bytes(&self.urls.list_file_url(archive))
                .await?;
            self.store.save(&format!("text/{}", archive), &bytes)?;
            archives_saved += 1;
        }

        self.transition(CrawlState::Done)?;
        tracing::info!("Saved {} text archives", archives_saved);

        Ok(CrawlReport {
            months_visited: months.len(),
            archives_saved,
            ..CrawlReport::default()
        })
    }

    async fn login_if_private(&mut self) -> Result<(), MirrorError> {
        if !self.config.is_private() {
            return Ok(());
        }

        self.fetcher
            .login(
                self.urls.list_url(),
                &self.config.mailman.email,
                &self.config.mailman.password,
            )
            .await?;
        self.transition(CrawlState::LoggedIn)
    }

    fn transition(&mut self, next: CrawlState) -> Result<(), MirrorError> {
        if !self.state.can_transition_to(next) {
            return Err(MirrorError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::trace!("{} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }

    /// Fetches a page, saves its filtered copy and returns the unfiltered source
    async fn mirror_page(&self, url: &str, relative: &str) -> Result<String, MirrorError> {
        let source = self.fetcher.fetch_text(url).await?;
        let filtered = self.filter.filter(&source);
        self.store.save(relative, filtered.as_bytes())?;
        Ok(source)
    }

    async fn crawl_month(&mut self, month: &MonthArchive) -> Result<(), MirrorError> {
        self.transition(CrawlState::WalkingMonths)?;
        self.cursor.start_month();
        tracing::info!("Mirroring {}", month.name);

        let date_page = self
            .mirror_page(
                &self.urls.month_file_url(&month.name, "date.html"),
                &format!("{}/date.html", month.name),
            )
            .await?;
        let links = parse_message_links(&date_page);
        tracing::debug!("{} lists {} messages", month.name, links.len());

        for href in &links {
            let url = self.urls.resolve_in_month(&month.name, href)?;

            self.transition(CrawlState::WalkingMessages)?;
            self.throttle.wait().await;
            self.crawl_message(&month.name, url).await?;

            if !self.cursor.keep_going() {
                tracing::info!(
                    "Feed is full and messages are older than {} hours; stopping",
                    self.config.local.hours_to_go_back
                );
                break;
            }
        }

        self.transition(CrawlState::WalkingMonths)?;
        if self.cursor.should_refresh_auxiliary() {
            self.refresh_auxiliary(month).await?;
        }
        Ok(())
    }

    async fn crawl_message(&mut self, month: &str, url: Url) -> Result<(), MirrorError> {
        let relative = format!("{}/{}", month, file_name(&url)?);
        let source = self.fetcher.fetch_text(url.as_str()).await?;
        let filtered = self.filter.filter(&source);

        let fields = match self.extractor.extract(&filtered) {
            Ok(fields) => fields,
            Err(e) => {
                self.store.save(&relative, filtered.as_bytes())?;
                tracing::warn!("Mirrored {} but left it out of the feed: {}", url, e);
                self.cursor.record_message();
                return Ok(());
            }
        };

        let page = MessagePage {
            remote_url: url,
            local_path: relative,
            filtered_html: filtered,
            fields,
        };
        page.save(self.store.as_ref())?;

        let age_hours = page.fields.age_hours(Utc::now());
        tracing::debug!("{} is {:.1} hours old", page.remote_url, age_hours);

        let stop = self.cursor.should_stop(
            age_hours,
            self.config.look_back_hours(),
            self.config.rss.items_for_rss,
        );
        self.cursor.record_message();
        if stop {
            self.cursor.stop();
            return Ok(());
        }

        self.cursor.record_readable();
        if !self.feed.is_full() {
            self.feed.append(FeedItem::from_page(&page, &self.config.local.publish_url));
        }
        Ok(())
    }

    /// Re-mirrors the thread, subject and author views and the text archive
    async fn refresh_auxiliary(&self, month: &MonthArchive) -> Result<(), MirrorError> {
        for view in AUXILIARY_VIEWS {
            let file = format!("{}.html", view);
            self.mirror_page(
                &self.urls.month_file_url(&month.name, &file),
                &format!("{}/{}", month.name, file),
            )
            .await?;
        }

        let archive = format!("{}.txt.gz", month.name);
        let bytes = self
            .fetcher
            .fetch_bytes(&self.urls.list_file_url(&archive))
            .await?;
        self.store.save(&archive, &bytes)?;
        Ok(())
    }
}
