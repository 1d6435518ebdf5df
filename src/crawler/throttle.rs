//! Fixed-interval request pacing
//!
//! Messages are fetched one after another with a short pause in between so
//! the source server is not hammered.

use std::time::{Duration, Instant};

/// Spaces out successive requests by at least `interval`
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Waits until `interval` has passed since the previous call
    ///
    /// The first call returns immediately.
    pub async fn wait(&mut self) {
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                tokio::time::sleep(self.interval - elapsed).await;
            }
        }
        self.last = Some(Instant::now());
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}
