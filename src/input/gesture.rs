//! Swipe detector — classifies pointer sessions on the watch surface.
//!
//! DESIGN
//! ======
//! One detector instance tracks one pointer session: press records the
//! origin and arms a long-press, movement either stays a candidate tap/hold
//! or commits to a horizontal drag, release classifies the drag as a swipe.
//! Dragging and a long-press are mutually exclusive within a session —
//! crossing the drag-start distance cancels the pending long-press.
//!
//! The detector is clock-agnostic: callers pass `Instant`s in, which keeps
//! gesture classification deterministic under test.

use std::time::{Duration, Instant};

use crate::input::long_press::{DEFAULT_LONG_PRESS, LongPress};

/// Minimum horizontal displacement at release for a drag to count as a swipe.
pub const DEFAULT_SWIPE_THRESHOLD: f64 = 80.0;

/// Displacement past which a press commits to dragging.
pub const DRAG_START_DISTANCE: f64 = 10.0;

/// A position on the gesture surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GestureConfig {
    pub swipe_threshold: f64,
    pub drag_start: f64,
    pub long_press: Duration,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            swipe_threshold: DEFAULT_SWIPE_THRESHOLD,
            drag_start: DRAG_START_DISTANCE,
            long_press: DEFAULT_LONG_PRESS,
        }
    }
}

/// Classified horizontal swipe, reported once per session at release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swipe {
    Left,
    Right,
}

/// What the press landed on. Presses on embedded controls (buttons inside
/// the gesture surface) never capture a gesture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressTarget {
    Surface,
    Control,
}

#[derive(Debug)]
pub struct SwipeDetector {
    config: GestureConfig,
    origin: Option<Point>,
    drag_offset: f64,
    dragging: bool,
    long_press: LongPress,
}

impl SwipeDetector {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(GestureConfig::default())
    }

    #[must_use]
    pub fn with_config(config: GestureConfig) -> Self {
        Self {
            config,
            origin: None,
            drag_offset: 0.0,
            dragging: false,
            long_press: LongPress::new(config.long_press),
        }
    }

    /// Begin a session: record the origin and arm the long-press. A press
    /// on a control is ignored entirely.
    pub fn press(&mut self, at: Point, now: Instant, target: PressTarget) {
        if target == PressTarget::Control {
            return;
        }
        self.origin = Some(at);
        self.drag_offset = 0.0;
        self.dragging = false;
        self.long_press.arm(now);
    }

    /// Track movement. Returns the live horizontal offset for visual
    /// tracking; the offset is only committed as a swipe at release.
    pub fn movement(&mut self, at: Point) -> f64 {
        let Some(origin) = self.origin else {
            return 0.0;
        };

        let dx = at.x - origin.x;
        let dy = at.y - origin.y;

        // Horizontal movement must dominate before a drag starts.
        if dx.abs() > dy.abs() && dx.abs() > self.config.drag_start {
            self.dragging = true;
            self.drag_offset = dx;
            self.long_press.cancel();
        }

        self.drag_offset
    }

    /// End the session. Reports at most one swipe, then clears all state.
    pub fn release(&mut self, at: Point) -> Option<Swipe> {
        let Some(origin) = self.origin else {
            self.clear();
            return None;
        };

        let dx = at.x - origin.x;
        let swipe = if self.dragging && dx.abs() > self.config.swipe_threshold {
            if dx > 0.0 { Some(Swipe::Right) } else { Some(Swipe::Left) }
        } else {
            None
        };

        self.clear();
        swipe
    }

    /// Pointer left the surface: the session is abandoned and an armed
    /// long-press must not fire.
    pub fn leave(&mut self) {
        self.clear();
    }

    /// Drive the embedded long-press. Returns `true` exactly once per
    /// session, and never once the session has committed to dragging.
    pub fn poll_long_press(&mut self, now: Instant) -> bool {
        if self.dragging {
            return false;
        }
        self.long_press.poll(now)
    }

    #[must_use]
    pub fn drag_offset(&self) -> f64 {
        self.drag_offset
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    #[must_use]
    pub fn is_pressed(&self) -> bool {
        self.origin.is_some()
    }

    fn clear(&mut self) {
        self.origin = None;
        self.drag_offset = 0.0;
        self.dragging = false;
        self.long_press.cancel();
    }
}

impl Default for SwipeDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "gesture_test.rs"]
mod tests;
