//! Cancel-and-reschedule deadline
//!
//! The core owns no event loop. A [`Timer`] only remembers when it is due;
//! the embedder polls it (through
//! [`EditorClient::poll_timers`](super::EditorClient::poll_timers)) at or
//! after [`deadline`](Timer::deadline).

use std::time::{Duration, Instant};

/// A single pending deadline carrying a payload
#[derive(Debug, Clone)]
pub struct Timer<T> {
    pending: Option<(Instant, T)>,
}

impl<T> Timer<T> {
    pub fn new() -> Self {
        Self { pending: None }
    }

    /// Arm the timer `delay` after `now`, replacing any pending deadline
    pub fn schedule(&mut self, now: Instant, delay: Duration, payload: T) {
        self.pending = Some((now + delay, payload));
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(deadline, _)| *deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Disarm and return the payload if the deadline has passed
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((deadline, _)) if *deadline <= now => self.pending.take().map(|(_, payload)| payload),
            _ => None,
        }
    }
}

impl<T> Default for Timer<T> {
    fn default() -> Self {
        Self::new()
    }
}
