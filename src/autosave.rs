//! Debounced auto-save.
//!
//! Every edit calls [`Debouncer::touch`], which pushes the deadline out to
//! `now + delay`. The owner polls with the current time and saves when
//! [`Debouncer::poll`] says so. The last edit before a quiet period wins.
//!
//! There is no `cancel`. A pending save is only replaced by a newer edit, or
//! dropped together with its owner.
//!
//! Time is passed in rather than read, so tests can step through a timeline
//! without sleeping.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Record an edit at `now`, rescheduling any pending save.
    pub fn touch(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Returns `true` once when the quiet period after the last touch has
    /// elapsed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}
