//! Content filter for mirrored pages
//!
//! Every fetched page passes through an ordered chain of rewrite stages before
//! it is written to disk. The order is fixed because later stages rely on the
//! output of earlier ones:
//!
//! 1. Custom search/replace rules
//! 2. Address redaction (when enabled)
//! 3. Leftover links into the source archive become `#`
//! 4. Source list-info links point to the configured page
//! 5. Deeply quoted lines are removed (when a depth is set)
//! 6. Custom markup is injected before `</head>` (when configured)

mod stages;

pub use stages::{
    AddressRedactionStage, FilterStage, HeadInjectionStage, LinkRewriteStage, QuoteStripStage,
    SearchReplaceStage,
};

use crate::config::ArchiveConfig;
use crate::url::ArchiveUrls;
use crate::ConfigError;

/// The ordered rewrite pipeline applied to every page
pub struct ContentFilter {
    stages: Vec<Box<dyn FilterStage>>,
}

impl ContentFilter {
    /// Builds the pipeline for a configuration
    ///
    /// # Arguments
    ///
    /// * `config` - The run configuration
    /// * `urls` - The source archive's URL layout
    ///
    /// # Returns
    ///
    /// * `Ok(ContentFilter)` - The pipeline, stages in their fixed order
    /// * `Err(ConfigError)` - A search/replace pattern failed to compile
    pub fn new(config: &ArchiveConfig, urls: &ArchiveUrls) -> Result<Self, ConfigError> {
        let mut stages: Vec<Box<dyn FilterStage>> = Vec::new();

        if !config.search_replace.is_empty() {
            stages.push(Box::new(SearchReplaceStage::new(&config.search_replace)?));
        }

        if config.conversion.filter_email_addresses {
            stages.push(Box::new(AddressRedactionStage::new()?));
        }

        stages.push(Box::new(LinkRewriteStage::archive_links(urls.list_url())?));

        if !config.conversion.list_info_url.is_empty() {
            stages.push(Box::new(LinkRewriteStage::list_info(
                urls.list_info_url(),
                &config.conversion.list_info_url,
            )?));
        }

        if config.conversion.strip_quotes > 0 {
            stages.push(Box::new(QuoteStripStage::new(
                config.conversion.strip_quotes,
            )?));
        }

        if let Some(head_html) = config.head_html.as_deref().filter(|h| !h.is_empty()) {
            stages.push(Box::new(HeadInjectionStage::new(head_html)?));
        }

        tracing::debug!(
            "Content filter stages: {}",
            stages
                .iter()
                .map(|s| s.name())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(Self { stages })
    }

    /// Names of the active stages, in application order
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Runs a page through every stage
    pub fn filter(&self, raw: &str) -> String {
        let mut page = raw.to_string();
        for stage in &self.stages {
            page = stage.apply(&page).into_owned();
        }
        page
    }
}
