//! Simulator control — the host-process start/stop surface.
//!
//! DESIGN
//! ======
//! `SimulatorControl` owns at most one running simulator task and reports
//! every operation as a `ControlResult`, the same `{ success, error? }`
//! shape the host process expects from an invocation. Stopping aborts the
//! driver task, which drops its connection; the relay then notifies panels
//! through its normal device-departure path.

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::info;

use crate::services::simulator::{self, DeviceConfig};

/// Outcome of a start/stop invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ControlResult {
    #[must_use]
    pub fn ok() -> Self {
        Self { success: true, error: None }
    }

    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self { success: false, error: Some(error.into()) }
    }
}

pub struct SimulatorControl {
    config: DeviceConfig,
    task: Option<JoinHandle<()>>,
}

impl SimulatorControl {
    #[must_use]
    pub fn new(config: DeviceConfig) -> Self {
        Self { config, task: None }
    }

    /// Spawn the simulator. Fails while a previous session is still live.
    pub fn start(&mut self) -> ControlResult {
        if self.is_running() {
            return ControlResult::failed("simulator already running");
        }
        self.task = Some(tokio::spawn(simulator::run(self.config.clone())));
        info!("ai simulator started");
        ControlResult::ok()
    }

    /// Abort the running simulator and drop its connection.
    pub fn stop(&mut self) -> ControlResult {
        match self.task.take() {
            Some(task) => {
                task.abort();
                info!("ai simulator stopped");
                ControlResult::ok()
            }
            None => ControlResult::failed("simulator not running"),
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for SimulatorControl {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
#[path = "control_test.rs"]
mod tests;
