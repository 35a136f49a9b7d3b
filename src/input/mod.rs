//! Pointer-interaction layer for the circular watch face.
//!
//! ARCHITECTURE
//! ============
//! These modules own gesture classification so screen components can stay
//! declarative: a screen feeds pointer events into a `SwipeDetector` (or the
//! dial helpers) and reacts to the classified result. Nothing here touches
//! the link layer or any timer driver.

pub mod dial;
pub mod gesture;
pub mod long_press;

pub use gesture::Point;
