//! WebSocket handler — AI link relay.
//!
//! DESIGN
//! ======
//! On upgrade, generates a connection ID and enters a `select!` loop:
//! - Incoming client messages → parse + dispatch by message type
//! - Relayed messages from peers → forward to this client
//!
//! The relay owns routing policy: device traffic (`ai_status`,
//! `ai_conversation`, `ai_config_result`) fans out to panels, panel
//! `ai_config` pushes route to the device, heartbeats are recorded and not
//! forwarded. Clients that never handshook cannot inject traffic.
//!
//! ERROR HANDLING
//! ==============
//! Malformed JSON is logged and dropped — it never closes the connection
//! and never reaches peers. Full peer channels drop messages best-effort;
//! the link has no delivery guarantee beyond transport order.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → wait for `handshake`, register role, reply `handshake_ack`
//! 2. Panel registration replays status + buffered conversation
//! 3. Dispatch loop relays by type
//! 4. Close → deregister; device departure synthesizes an offline status

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::message::{ClientRole, LinkMessage, MessageKind, now_ms};
use crate::state::{AppState, ConnectedClient, DevicePresence};

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState) {
    let client_id = Uuid::new_v4();

    // Per-connection channel for messages relayed from peers.
    let (client_tx, mut client_rx) = mpsc::channel::<LinkMessage>(256);

    info!(%client_id, "link: client connected");

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(msg) = msg else { break };
                let Ok(msg) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        let replies = process_inbound_text(&state, client_id, &client_tx, &text).await;
                        for reply in replies {
                            let _ = send_message(&mut socket, &reply).await;
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            Some(msg) = client_rx.recv() => {
                if send_message(&mut socket, &msg).await.is_err() {
                    break;
                }
            }
        }
    }

    disconnect(&state, client_id).await;
    info!(%client_id, "link: client disconnected");
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Parse and process one inbound text frame, returning replies for the
/// sender. Kept free of socket concerns so tests can exercise the relay
/// end-to-end through channels.
async fn process_inbound_text(
    state: &AppState,
    client_id: Uuid,
    client_tx: &mpsc::Sender<LinkMessage>,
    text: &str,
) -> Vec<LinkMessage> {
    let msg: LinkMessage = match serde_json::from_str(text) {
        Ok(msg) => msg,
        Err(e) => {
            warn!(%client_id, error = %e, "link: malformed message dropped");
            return Vec::new();
        }
    };

    match msg.kind {
        MessageKind::Handshake => handle_handshake(state, client_id, client_tx, &msg).await,
        MessageKind::Heartbeat => {
            handle_heartbeat(state, client_id, &msg).await;
            Vec::new()
        }
        MessageKind::AiStatus => {
            handle_status(state, client_id, &msg).await;
            Vec::new()
        }
        MessageKind::AiConversation => {
            handle_conversation(state, client_id, &msg).await;
            Vec::new()
        }
        MessageKind::AiConfig => {
            relay_from(state, client_id, ClientRole::ControlPanel, ClientRole::Esp32Device, &msg).await;
            Vec::new()
        }
        MessageKind::AiConfigResult => {
            relay_from(state, client_id, ClientRole::Esp32Device, ClientRole::ControlPanel, &msg).await;
            Vec::new()
        }
        MessageKind::HandshakeAck => Vec::new(),
        MessageKind::Unknown => {
            debug!(%client_id, "link: unknown message type ignored");
            Vec::new()
        }
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

async fn handle_handshake(
    state: &AppState,
    client_id: Uuid,
    client_tx: &mpsc::Sender<LinkMessage>,
    msg: &LinkMessage,
) -> Vec<LinkMessage> {
    let role = match msg.client_type {
        Some(role @ (ClientRole::Esp32Device | ClientRole::ControlPanel)) => role,
        _ => {
            warn!(%client_id, "link: handshake without a known clientType dropped");
            return Vec::new();
        }
    };

    let mut link = state.link.write().await;
    link.clients.insert(
        client_id,
        ConnectedClient { role, device_id: msg.device_id.clone(), tx: client_tx.clone() },
    );

    let mut replies = vec![LinkMessage::handshake_ack()];
    if role == ClientRole::Esp32Device {
        // Fresh device connection: the previous conversation is over.
        link.history.clear();
        link.heartbeat = None;
        info!(%client_id, device_id = ?msg.device_id, "link: device registered");
    } else {
        // Replay the current status and buffered conversation, in order.
        if let Some(status) = &link.last_status {
            replies.push(LinkMessage::status(status));
        }
        replies.extend(link.history.iter().map(LinkMessage::conversation));
        info!(%client_id, replayed = link.history.len(), "link: control panel registered");
    }
    replies
}

async fn handle_heartbeat(state: &AppState, client_id: Uuid, msg: &LinkMessage) {
    let Some(hb) = msg.heartbeat_data() else {
        warn!(%client_id, "link: heartbeat with invalid payload dropped");
        return;
    };

    let mut link = state.link.write().await;
    if link.role_of(client_id) != Some(ClientRole::Esp32Device) {
        warn!(%client_id, "link: heartbeat from non-device dropped");
        return;
    }
    link.heartbeat = Some(DevicePresence {
        device_id: hb.device_id,
        uptime: hb.uptime,
        wifi_signal: hb.wifi_signal,
        seen_at: Instant::now(),
    });
}

async fn handle_status(state: &AppState, client_id: Uuid, msg: &LinkMessage) {
    let Some(status) = msg.status_data() else {
        warn!(%client_id, "link: ai_status with invalid payload dropped");
        return;
    };

    let mut link = state.link.write().await;
    if link.role_of(client_id) != Some(ClientRole::Esp32Device) {
        warn!(%client_id, "link: ai_status from non-device dropped");
        return;
    }
    link.last_status = Some(status);
    for tx in link.senders_for(ClientRole::ControlPanel) {
        let _ = tx.try_send(msg.clone());
    }
}

async fn handle_conversation(state: &AppState, client_id: Uuid, msg: &LinkMessage) {
    let Some(mut utterance) = msg.conversation_data() else {
        warn!(%client_id, "link: ai_conversation with invalid payload dropped");
        return;
    };
    if utterance.timestamp.is_none() {
        utterance.timestamp = Some(now_ms());
    }

    let mut link = state.link.write().await;
    if link.role_of(client_id) != Some(ClientRole::Esp32Device) {
        warn!(%client_id, "link: ai_conversation from non-device dropped");
        return;
    }

    let forward = LinkMessage::conversation(&utterance);
    link.history.push(utterance);
    for tx in link.senders_for(ClientRole::ControlPanel) {
        let _ = tx.try_send(forward.clone());
    }
}

/// Relay a message from clients of `from` role to all clients of `to` role.
/// Messages from unregistered or wrong-role senders are dropped.
async fn relay_from(
    state: &AppState,
    client_id: Uuid,
    from: ClientRole,
    to: ClientRole,
    msg: &LinkMessage,
) {
    let link = state.link.read().await;
    if link.role_of(client_id) != Some(from) {
        warn!(%client_id, kind = ?msg.kind, "link: message from unexpected sender dropped");
        return;
    }
    for tx in link.senders_for(to) {
        let _ = tx.try_send(msg.clone());
    }
}

// =============================================================================
// DISCONNECT
// =============================================================================

/// Deregister a connection. A departing device additionally produces an
/// offline status override for the panels and ends the buffered
/// conversation.
async fn disconnect(state: &AppState, client_id: Uuid) {
    let mut link = state.link.write().await;
    let Some(client) = link.clients.remove(&client_id) else {
        return;
    };
    if client.role != ClientRole::Esp32Device {
        return;
    }

    let mut status = link.last_status.take().unwrap_or_default();
    status.online = false;
    status.talking = false;
    link.last_status = Some(status.clone());
    link.history.clear();
    link.heartbeat = None;

    let offline = LinkMessage::status(&status);
    for tx in link.senders_for(ClientRole::ControlPanel) {
        let _ = tx.try_send(offline.clone());
    }
    info!(%client_id, "link: device departed, panels notified");
}

// =============================================================================
// HELPERS
// =============================================================================

async fn send_message(socket: &mut WebSocket, msg: &LinkMessage) -> Result<(), ()> {
    let json = match serde_json::to_string(msg) {
        Ok(json) => json,
        Err(e) => {
            warn!(error = %e, "link: failed to serialize message");
            return Err(());
        }
    };
    socket.send(Message::Text(json.into())).await.map_err(|_| ())
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
