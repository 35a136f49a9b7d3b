//! Domain services behind the relay and its clients.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the simulator, panel, and settings logic so the WS
//! route handler can stay focused on protocol translation and fan-out. The
//! simulator and panel each split into a sans-IO core (deterministic,
//! clock-injected, unit-tested) and a thin tokio driver that owns the
//! socket.

pub mod control;
pub mod conversation;
pub mod panel;
pub mod settings;
pub mod simulator;
