//! State module for tracking run progress
//!
//! # Components
//!
//! - `CrawlState`: The phase of a run (index, months, messages, done)
//! - `CrawlCursor`: Message counters and the keep-going flag

mod crawl_state;
mod cursor;

pub use crawl_state::CrawlState;
pub use cursor::CrawlCursor;
