#![forbid(unsafe_code)]

//! Single-deadline debouncer.
//!
//! Every [`schedule`](Debouncer::schedule) replaces the pending deadline, so a
//! burst of edits collapses into one fire at `last edit + delay`. Time is
//! passed in by the caller; the debouncer never reads a clock.

use web_time::Duration;

/// Last-write-wins deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Duration>,
}

impl Debouncer {
    /// Create an idle debouncer with the given quiet window.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// The quiet window.
    #[inline]
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Pending deadline, if any.
    #[inline]
    #[must_use]
    pub const fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Whether a fire is pending.
    #[inline]
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// (Re)start the window at `now`. Returns the new deadline.
    pub fn schedule(&mut self, now: Duration) -> Duration {
        let deadline = now.saturating_add(self.delay);
        self.deadline = Some(deadline);
        deadline
    }

    /// Drop the pending deadline.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Consume the deadline if it has passed. Returns `true` at most once per
    /// scheduled window.
    pub fn fire_if_due(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
