//! Panel consumer — the control panel's view of the AI link.
//!
//! DESIGN
//! ======
//! `PanelLink` owns one background task that dials the relay, handshakes as
//! `control_panel`, and folds inbound messages into a shared `PanelState`
//! through the pure `apply` function. On close or connect failure it
//! retries after a fixed delay, indefinitely, with no backoff growth and no
//! retry cap; each successful connect fully replaces the previous session
//! and starts a fresh conversation history.
//!
//! ERROR HANDLING
//! ==============
//! Malformed inbound JSON is logged and dropped; it neither closes the
//! connection nor surfaces to the owner. Transport failures only ever
//! degrade to the reconnect loop.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{RwLock, mpsc};
use tokio::task::JoinHandle;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite};
use tracing::{info, warn};

use crate::message::{
    AiStatus, ClientRole, ConfigResult, ConversationMessage, LinkMessage, MessageKind, Role, now_ms,
};
use crate::services::simulator::DEFAULT_SERVER_URL;

/// Fixed delay before every reconnection attempt.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

// =============================================================================
// CONFIG AND STATE
// =============================================================================

#[derive(Debug, Clone)]
pub struct PanelConfig {
    pub server_url: String,
    pub reconnect_delay: Duration,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self { server_url: DEFAULT_SERVER_URL.into(), reconnect_delay: RECONNECT_DELAY }
    }
}

impl PanelConfig {
    #[must_use]
    pub fn new(server_url: impl Into<String>) -> Self {
        Self { server_url: server_url.into(), ..Self::default() }
    }
}

/// Everything the panel displays.
#[derive(Debug, Clone, Default)]
pub struct PanelState {
    pub connected: bool,
    pub status: AiStatus,
    /// Conversation for the current connection, oldest first.
    pub history: Vec<ConversationMessage>,
    pub last_config_result: Option<ConfigResult>,
}

// =============================================================================
// MESSAGE FOLDING
// =============================================================================

/// Begin a fresh session: the history of the previous connection does not
/// survive a reconnect.
pub fn begin_session(state: &mut PanelState) {
    state.connected = true;
    state.history.clear();
}

/// Fold one inbound message into the panel state. `now` stamps utterances
/// that arrived without a timestamp.
pub fn apply(state: &mut PanelState, msg: &LinkMessage, now: u64) {
    match msg.kind {
        MessageKind::AiStatus => {
            if let Some(status) = msg.status_data() {
                state.status = status;
            } else {
                warn!("panel: ai_status with invalid payload dropped");
            }
        }
        MessageKind::AiConversation => {
            let Some(mut utterance) = msg.conversation_data() else {
                warn!("panel: ai_conversation with invalid payload dropped");
                return;
            };
            if utterance.timestamp.is_none() {
                utterance.timestamp = Some(now);
            }
            if utterance.role == Role::Assistant {
                state.status.last_message = utterance.text.clone();
            }
            state.history.push(utterance);
        }
        MessageKind::AiConfigResult => {
            if let Some(result) = msg.config_result_data() {
                state.last_config_result = Some(result);
            }
        }
        _ => {}
    }
}

// =============================================================================
// LINK
// =============================================================================

pub struct PanelLink {
    state: Arc<RwLock<PanelState>>,
    outbound: mpsc::Sender<LinkMessage>,
    task: JoinHandle<()>,
}

impl PanelLink {
    /// Spawn the consumer task. It keeps dialing until dropped.
    #[must_use]
    pub fn spawn(config: PanelConfig) -> Self {
        let state = Arc::new(RwLock::new(PanelState::default()));
        let (outbound_tx, outbound_rx) = mpsc::channel(64);
        let task = tokio::spawn(run(config, Arc::clone(&state), outbound_rx));
        Self { state, outbound: outbound_tx, task }
    }

    /// Cloned snapshot of the current panel state.
    pub async fn snapshot(&self) -> PanelState {
        self.state.read().await.clone()
    }

    /// Queue a configuration push toward the device.
    pub async fn send_config(&self, config: serde_json::Value) -> bool {
        self.outbound.send(LinkMessage::config(config)).await.is_ok()
    }
}

impl Drop for PanelLink {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run(
    config: PanelConfig,
    state: Arc<RwLock<PanelState>>,
    mut outbound: mpsc::Receiver<LinkMessage>,
) {
    loop {
        match connect_async(&config.server_url).await {
            Ok((ws, _)) => {
                info!(url = %config.server_url, "panel: connected");
                drive(ws, &state, &mut outbound).await;
                warn!("panel: connection closed");
            }
            Err(e) => {
                warn!(url = %config.server_url, error = %e, "panel: connect failed");
            }
        }
        state.write().await.connected = false;
        tokio::time::sleep(config.reconnect_delay).await;
    }
}

async fn drive(
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    state: &Arc<RwLock<PanelState>>,
    outbound: &mut mpsc::Receiver<LinkMessage>,
) {
    let (mut write, mut read) = ws.split();

    begin_session(&mut *state.write().await);

    let handshake = LinkMessage::handshake(ClientRole::ControlPanel, None);
    let Ok(json) = serde_json::to_string(&handshake) else {
        return;
    };
    if write.send(tungstenite::Message::Text(json.into())).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            inbound = read.next() => {
                match inbound {
                    Some(Ok(tungstenite::Message::Text(text))) => {
                        match serde_json::from_str::<LinkMessage>(&text) {
                            Ok(msg) => apply(&mut *state.write().await, &msg, now_ms()),
                            Err(e) => warn!(error = %e, "panel: malformed message dropped"),
                        }
                    }
                    Some(Ok(tungstenite::Message::Close(_))) | None => return,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(error = %e, "panel: socket error");
                        return;
                    }
                }
            }
            Some(msg) = outbound.recv() => {
                let Ok(json) = serde_json::to_string(&msg) else { continue };
                if write.send(tungstenite::Message::Text(json.into())).await.is_err() {
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "panel_test.rs"]
mod tests;
