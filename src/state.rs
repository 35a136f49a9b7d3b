//! Shared relay state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the live link state: connected clients keyed by connection ID, the
//! latest device status snapshot, the buffered conversation for the current
//! device connection, and the last heartbeat. Everything lives behind one
//! `RwLock`; the relay mutates it only from WS dispatch, one message at a
//! time.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

use crate::message::{AiStatus, ClientRole, ConversationMessage, LinkMessage};

// =============================================================================
// CLIENTS
// =============================================================================

/// One live WS connection after a successful handshake.
pub struct ConnectedClient {
    pub role: ClientRole,
    pub device_id: Option<String>,
    /// Sender for outgoing messages; the connection task drains it.
    pub tx: mpsc::Sender<LinkMessage>,
}

/// Liveness info from the most recent device heartbeat.
#[derive(Debug, Clone)]
pub struct DevicePresence {
    pub device_id: String,
    pub uptime: u64,
    pub wifi_signal: i32,
    pub seen_at: Instant,
}

// =============================================================================
// LINK STATE
// =============================================================================

#[derive(Default)]
pub struct LinkState {
    pub clients: HashMap<Uuid, ConnectedClient>,
    /// Latest status pushed by the device, replayed to late-joining panels.
    pub last_status: Option<AiStatus>,
    /// Conversation buffer for the current device connection. Cleared when
    /// the device disconnects or re-handshakes.
    pub history: Vec<ConversationMessage>,
    pub heartbeat: Option<DevicePresence>,
}

impl LinkState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Senders of all connected clients with the given role.
    #[must_use]
    pub fn senders_for(&self, role: ClientRole) -> Vec<mpsc::Sender<LinkMessage>> {
        self.clients
            .values()
            .filter(|client| client.role == role)
            .map(|client| client.tx.clone())
            .collect()
    }

    #[must_use]
    pub fn role_of(&self, client_id: Uuid) -> Option<ClientRole> {
        self.clients.get(&client_id).map(|client| client.role)
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum — the inner state is Arc-wrapped.
#[derive(Clone, Default)]
pub struct AppState {
    pub link: Arc<RwLock<LinkState>>,
}

impl AppState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::*;

    /// Register a client directly in state, bypassing the handshake.
    /// Returns the connection ID and the receiving end of its channel.
    pub async fn seed_client(
        state: &AppState,
        role: ClientRole,
        device_id: Option<&str>,
    ) -> (Uuid, mpsc::Receiver<LinkMessage>) {
        let client_id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(32);
        let mut link = state.link.write().await;
        link.clients
            .insert(client_id, ConnectedClient { role, device_id: device_id.map(str::to_owned), tx });
        (client_id, rx)
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
