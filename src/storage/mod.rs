//! Storage module for persisting mirrored pages
//!
//! Every page a run fetches ends up here: filtered HTML pages and the raw
//! monthly text archives. Files written before a fatal error stay on disk.

mod fs;
mod traits;

pub use fs::FsPageStore;
pub use traits::{PageStore, StorageError, StorageResult};
