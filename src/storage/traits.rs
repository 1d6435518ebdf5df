//! Storage traits and error types
//!
//! This module defines the trait interface for page stores and
//! associated error types.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while persisting pages
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid page path: {0}")]
    InvalidPath(String),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for page store implementations
///
/// Pages are addressed by a path relative to the store root, e.g.
/// `2009-February/date.html`. Saving a page that already exists replaces it.
pub trait PageStore: Send + Sync {
    /// Writes a page, creating parent directories as needed
    ///
    /// # Returns
    ///
    /// The absolute path the page was written to
    fn save(&self, relative: &str, contents: &[u8]) -> StorageResult<PathBuf>;

    /// Directory all pages are written under
    fn root(&self) -> &Path;
}
