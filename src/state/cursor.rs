//! Transient counters carried through one run

/// Tracks how many messages a run has mirrored and whether to keep going
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlCursor {
    /// Messages mirrored so far in this run
    pub messages_fetched: usize,

    /// Messages mirrored in the month currently being walked
    pub messages_fetched_this_month: usize,

    /// Mirrored messages that could be read and offered to the feed
    pub messages_readable: usize,

    keep_going: bool,
}

impl Default for CrawlCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl CrawlCursor {
    pub fn new() -> Self {
        Self {
            messages_fetched: 0,
            messages_fetched_this_month: 0,
            messages_readable: 0,
            keep_going: true,
        }
    }

    /// Resets the per-month counter
    pub fn start_month(&mut self) {
        self.messages_fetched_this_month = 0;
    }

    pub fn record_message(&mut self) {
        self.messages_fetched += 1;
        self.messages_fetched_this_month += 1;
    }

    /// Counts a mirrored message whose fields were extracted
    pub fn record_readable(&mut self) {
        self.messages_readable += 1;
    }

    /// Stops the walk over older messages and months
    pub fn stop(&mut self) {
        self.keep_going = false;
    }

    pub fn keep_going(&self) -> bool {
        self.keep_going
    }

    /// Decides whether a message of the given age ends the run
    ///
    /// The run stops once `feed_cap` readable messages have been seen and a
    /// message older than the look-back window turns up. Pages that could not
    /// be read never count towards the cap. Without a window the run never
    /// stops early. `messages_readable` must not yet include the message
    /// being checked.
    pub fn should_stop(&self, age_hours: f64, look_back: Option<u64>, feed_cap: usize) -> bool {
        match look_back {
            Some(hours) => age_hours > hours as f64 && self.messages_readable >= feed_cap,
            None => false,
        }
    }

    /// Whether the month's thread, subject and author views need refreshing
    ///
    /// True whenever the month produced a new message, whether or not the
    /// walk continues past it.
    pub fn should_refresh_auxiliary(&self) -> bool {
        self.messages_fetched_this_month > 0
    }
}
