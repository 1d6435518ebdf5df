//! URL handling module for Mailman-Mirror
//!
//! This module maps a list configuration onto the pipermail URL layout and
//! turns remote message URLs into local paths and public feed links.

mod layout;

pub use layout::{file_name, publish_link, ArchiveUrls};
