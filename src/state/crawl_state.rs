/// Crawl state definitions for tracking run progress
///
/// A run moves through these states strictly in order; the coordinator
/// checks every move against the transition table.
use std::fmt;

/// Represents the current phase of a mirror run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlState {
    /// Nothing fetched yet
    Init,

    /// A session cookie for a private archive has been established
    LoggedIn,

    /// Fetching and mirroring the top-level month index
    ListingIndex,

    /// Mirroring a month's date index or auxiliary pages
    WalkingMonths,

    /// Mirroring the messages of the current month
    WalkingMessages,

    /// Every month was visited or the stop condition fired
    Done,
}

impl CrawlState {
    /// Returns true if a run may move from this state to `next`
    pub fn can_transition_to(&self, next: CrawlState) -> bool {
        use CrawlState::*;

        matches!(
            (self, next),
            (Init, LoggedIn)
                | (Init, ListingIndex)
                | (LoggedIn, ListingIndex)
                | (ListingIndex, WalkingMonths)
                | (ListingIndex, Done)
                | (WalkingMonths, WalkingMessages)
                | (WalkingMonths, WalkingMonths)
                | (WalkingMonths, Done)
                | (WalkingMessages, WalkingMessages)
                | (WalkingMessages, WalkingMonths)
                | (WalkingMessages, Done)
        )
    }

    /// Returns true once the run has finished
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::LoggedIn => "logged_in",
            Self::ListingIndex => "listing_index",
            Self::WalkingMonths => "walking_months",
            Self::WalkingMessages => "walking_messages",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
