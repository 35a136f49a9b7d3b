//! `LinkMessage` — the universal message type of the AI link.
//!
//! ARCHITECTURE
//! ============
//! Every communication on the AI link is a `LinkMessage`: the device
//! simulator and control panel send JSON envelopes over WebSocket, the relay
//! server dispatches by `type`, and payloads ride in `data`. The wire format
//! is fixed by the ESP32 firmware, so field names here are literal
//! (`clientType`, `wifiSignal`, `lastMessage`) rather than idiomatic.
//!
//! DESIGN
//! ======
//! - The envelope is `{ type, data?, clientType?, deviceId? }`.
//! - `type` values outside the catalog deserialize to `MessageKind::Unknown`
//!   and are ignored by every consumer.
//! - Typed payload structs (`AiStatus`, `Heartbeat`, ...) round-trip through
//!   `data` with their exact camelCase wire names.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

// =============================================================================
// MESSAGE CATALOG
// =============================================================================

/// Wire `type` of a link message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Handshake,
    HandshakeAck,
    Heartbeat,
    AiStatus,
    AiConversation,
    AiConfig,
    AiConfigResult,
    /// Any `type` outside the catalog. Logged and dropped, never an error.
    #[serde(other)]
    Unknown,
}

/// Role announced in a `handshake` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientRole {
    Esp32Device,
    ControlPanel,
    #[serde(other)]
    Unknown,
}

// =============================================================================
// ENVELOPE
// =============================================================================

/// The universal message type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkMessage {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(rename = "clientType", default, skip_serializing_if = "Option::is_none")]
    pub client_type: Option<ClientRole>,
    #[serde(rename = "deviceId", default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

// =============================================================================
// PAYLOADS
// =============================================================================

/// Full device status snapshot, pushed on every heartbeat and state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiStatus {
    pub online: bool,
    pub talking: bool,
    pub wifi_signal: i32,
    pub uptime: u64,
    #[serde(default)]
    pub last_message: String,
}

impl Default for AiStatus {
    fn default() -> Self {
        Self { online: false, talking: false, wifi_signal: 0, uptime: 0, last_message: String::new() }
    }
}

/// Periodic liveness signal from the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Heartbeat {
    pub device_id: String,
    pub uptime: u64,
    pub wifi_signal: i32,
}

/// Speaker of a conversation utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One utterance. `timestamp` (ms since Unix epoch) may be absent on the
/// wire; the relay and panel stamp it before storing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: Role,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

/// Acknowledgment of an applied configuration push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigResult {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

// =============================================================================
// CONSTRUCTORS
// =============================================================================

/// Current time as milliseconds since Unix epoch.
#[must_use]
pub fn now_ms() -> u64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    u64::try_from(dur.as_millis()).unwrap_or(0)
}

impl LinkMessage {
    fn new(kind: MessageKind) -> Self {
        Self { kind, data: None, client_type: None, device_id: None }
    }

    fn with_data<T: Serialize>(kind: MessageKind, payload: &T) -> Self {
        let mut msg = Self::new(kind);
        msg.data = Some(serde_json::to_value(payload).unwrap_or_default());
        msg
    }

    /// Identify the connecting role. First message on every connection.
    #[must_use]
    pub fn handshake(role: ClientRole, device_id: Option<&str>) -> Self {
        let mut msg = Self::new(MessageKind::Handshake);
        msg.client_type = Some(role);
        msg.device_id = device_id.map(str::to_owned);
        msg
    }

    /// Server acknowledgment of a handshake. Carries empty data.
    #[must_use]
    pub fn handshake_ack() -> Self {
        let mut msg = Self::new(MessageKind::HandshakeAck);
        msg.data = Some(serde_json::json!({}));
        msg
    }

    #[must_use]
    pub fn heartbeat(hb: &Heartbeat) -> Self {
        Self::with_data(MessageKind::Heartbeat, hb)
    }

    #[must_use]
    pub fn status(status: &AiStatus) -> Self {
        Self::with_data(MessageKind::AiStatus, status)
    }

    #[must_use]
    pub fn conversation(utterance: &ConversationMessage) -> Self {
        Self::with_data(MessageKind::AiConversation, utterance)
    }

    /// Configuration push toward the device. The payload is opaque.
    #[must_use]
    pub fn config(config: serde_json::Value) -> Self {
        let mut msg = Self::new(MessageKind::AiConfig);
        msg.data = Some(config);
        msg
    }

    #[must_use]
    pub fn config_result(result: &ConfigResult) -> Self {
        Self::with_data(MessageKind::AiConfigResult, result)
    }
}

// =============================================================================
// PAYLOAD ACCESS
// =============================================================================

impl LinkMessage {
    fn parse_data<T: for<'de> Deserialize<'de>>(&self) -> Option<T> {
        let data = self.data.as_ref()?;
        serde_json::from_value(data.clone()).ok()
    }

    #[must_use]
    pub fn status_data(&self) -> Option<AiStatus> {
        self.parse_data()
    }

    #[must_use]
    pub fn heartbeat_data(&self) -> Option<Heartbeat> {
        self.parse_data()
    }

    #[must_use]
    pub fn conversation_data(&self) -> Option<ConversationMessage> {
        self.parse_data()
    }

    #[must_use]
    pub fn config_result_data(&self) -> Option<ConfigResult> {
        self.parse_data()
    }
}

#[cfg(test)]
#[path = "message_test.rs"]
mod tests;
