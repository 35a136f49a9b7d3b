//! Long-press state machine.
//!
//! DESIGN
//! ======
//! `Idle → Armed → Fired` or `Idle → Armed → Idle` (cancelled). The machine
//! is deadline-driven rather than callback-driven: the owner arms it on
//! press-start and polls it from its event loop. `cancel` synchronously
//! invalidates the deadline, so a poll that races a cancellation can never
//! fire, and `poll` clears the deadline on firing, so one press fires at
//! most once.

use std::time::{Duration, Instant};

/// Default hold duration before a press counts as a long-press.
pub const DEFAULT_LONG_PRESS: Duration = Duration::from_millis(800);

#[derive(Debug)]
pub struct LongPress {
    duration: Duration,
    deadline: Option<Instant>,
}

impl LongPress {
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self { duration, deadline: None }
    }

    /// Arm the timer. Re-arming replaces any previous deadline.
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.duration);
    }

    /// Cancel the pending timer. No-op when idle.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns `true` exactly once when the hold duration has elapsed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(at) if now >= at => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for LongPress {
    fn default() -> Self {
        Self::new(DEFAULT_LONG_PRESS)
    }
}

#[cfg(test)]
#[path = "long_press_test.rs"]
mod tests;
