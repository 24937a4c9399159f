//! Minimum-interval rate limiter

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

/// Lets an action run at most once per `min_interval`
///
/// Calls arriving inside the window are rejected outright; nothing is queued.
/// The window starts when an attempt is granted, so a run that fails still
/// consumes its interval.
#[derive(Debug)]
pub struct Throttle {
    min_interval: Duration,
    last_run: Mutex<Option<Instant>>,
}

impl Throttle {
    /// Create a throttle that grants its first attempt immediately
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_run: Mutex::new(None),
        }
    }

    /// Configured window
    #[must_use]
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Try to claim the next run
    ///
    /// Returns `true` and starts a new window if the previous one has
    /// elapsed, `false` otherwise.
    pub fn attempt(&self) -> bool {
        let now = Instant::now();
        let mut last_run = self.last_run.lock().unwrap_or_else(PoisonError::into_inner);
        match *last_run {
            Some(previous) if now.duration_since(previous) < self.min_interval => false,
            _ => {
                *last_run = Some(now);
                true
            }
        }
    }

    /// Time left until the next attempt would be granted
    #[must_use]
    pub fn remaining(&self) -> Duration {
        let last_run = self.last_run.lock().unwrap_or_else(PoisonError::into_inner);
        last_run.map_or(Duration::ZERO, |previous| {
            self.min_interval.saturating_sub(previous.elapsed())
        })
    }
}
