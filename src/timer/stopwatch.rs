//! Free-running stopwatch.
//!
//! DESIGN
//! ======
//! Elapsed time is recomputed from a captured start reference (wall-clock
//! delta) instead of per-tick increments, so display polling frequency and
//! scheduling latency cannot drift the reading. All operations take an
//! explicit `Instant`, which keeps the core deterministic under test.

use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub struct Stopwatch {
    accumulated: Duration,
    started_at: Option<Instant>,
}

impl Stopwatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from the current elapsed total. No-op while already running.
    pub fn start(&mut self, now: Instant) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
    }

    /// Freeze the elapsed total.
    pub fn pause(&mut self, now: Instant) {
        if let Some(started_at) = self.started_at.take() {
            self.accumulated += now.duration_since(started_at);
        }
    }

    /// Zero the elapsed total and stop, regardless of prior state.
    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
        self.started_at = None;
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    #[must_use]
    pub fn elapsed(&self, now: Instant) -> Duration {
        let live = self
            .started_at
            .map_or(Duration::ZERO, |started_at| now.duration_since(started_at));
        self.accumulated + live
    }

    /// Render the elapsed total as `HH:MM:SS.cc` (zero-padded centiseconds).
    #[must_use]
    pub fn format(&self, now: Instant) -> String {
        let ms = self.elapsed(now).as_millis();
        let total_seconds = ms / 1000;
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;
        let centiseconds = (ms % 1000) / 10;
        format!("{hours:02}:{minutes:02}:{seconds:02}.{centiseconds:02}")
    }
}

#[cfg(test)]
#[path = "stopwatch_test.rs"]
mod tests;
