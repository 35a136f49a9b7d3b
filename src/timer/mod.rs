//! Stopwatch and countdown cores.
//!
//! Both are plain structs with explicit lifecycles, owned by whatever
//! composition unit hosts them. Drivers feed them wall-clock `Instant`s or
//! once-per-second ticks; the cores never schedule anything themselves.

pub mod countdown;
pub mod stopwatch;
