//! Configuration module for Mailman-Mirror
//!
//! This module handles loading, parsing, and validating the TOML configuration
//! file, and resolves it into the immutable [`ArchiveConfig`] every component
//! receives at construction.
//!
//! # Example
//!
//! ```no_run
//! use mailman_mirror::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("mailman-mirror.toml")).unwrap();
//! println!("Publishing to: {}", config.local.publish_dir.display());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ArchiveConfig, Config, ConversionConfig, LocalConfig, MailmanConfig, RssConfig,
    SearchReplace,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, parse_config, parse_search_replace,
};
