//! Device simulator — stands in for the ESP32 AI module when no hardware
//! is attached.
//!
//! DESIGN
//! ======
//! Split into a sans-IO core and a thin tokio driver. `DeviceCore` owns all
//! device state (uptime, Wi-Fi signal, talking flag, the conversation flow,
//! and pending deadlines) and is driven by explicit `Instant`s, so every
//! behavior is unit-testable without a socket or a clock. The driver owns
//! the WebSocket, the heartbeat/conversation intervals, and the deadline
//! sleeper.
//!
//! LIFECYCLE
//! =========
//! connect → handshake → (ack → initial status) → heartbeat every 5 s,
//! occasional scripted conversations, config acks after a simulated 1 s
//! apply delay. On close or error the simulator stops; restarting is the
//! controller's job (the panel is the side that reconnects).

use std::time::{Duration, Instant};

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite};
use tracing::{info, warn};

use crate::message::{
    AiStatus, ClientRole, ConfigResult, ConversationMessage, Heartbeat, LinkMessage, MessageKind,
    Role, now_ms,
};
use crate::services::conversation::{ConversationFlow, Exchange, FlowEvent, Step};

// =============================================================================
// CONSTANTS
// =============================================================================

pub const DEFAULT_SERVER_URL: &str = "ws://localhost:8765";
pub const DEFAULT_DEVICE_ID: &str = "ai-simulator-001";

/// Fixed heartbeat cadence.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);

/// How often the simulator considers starting a scripted conversation.
pub const CONVERSATION_INTERVAL: Duration = Duration::from_secs(15);

/// Probability of starting a conversation at each consideration.
pub const CONVERSATION_CHANCE: f64 = 0.3;

/// Simulated time to apply a pushed configuration.
pub const CONFIG_ACK_DELAY: Duration = Duration::from_secs(1);

const INITIAL_WIFI_SIGNAL: i32 = -45;

/// Canned exchanges the simulator picks from.
const SCRIPTS: &[(&str, &str)] = &[
    ("What's the weather like today?", "It is sunny and mild today, a great day to be outside."),
    ("What time is it?", "It is 3:25 in the afternoon."),
    ("Set an alarm for me", "Done, your alarm is set for 7 o'clock tomorrow morning."),
    ("Play some music", "Now playing some light music for you."),
    ("Turn off the living room lights", "Okay, the living room lights are now off."),
];

// =============================================================================
// CONFIG
// =============================================================================

#[derive(Debug, Clone)]
pub struct DeviceConfig {
    pub server_url: String,
    pub device_id: String,
    pub heartbeat_interval: Duration,
    pub conversation_interval: Duration,
    pub conversation_chance: f64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.into(),
            device_id: DEFAULT_DEVICE_ID.into(),
            heartbeat_interval: HEARTBEAT_INTERVAL,
            conversation_interval: CONVERSATION_INTERVAL,
            conversation_chance: CONVERSATION_CHANCE,
        }
    }
}

// =============================================================================
// CORE
// =============================================================================

pub struct DeviceCore {
    config: DeviceConfig,
    online: bool,
    talking: bool,
    uptime: u64,
    wifi_signal: i32,
    last_message: String,
    flow: ConversationFlow,
    flow_due: Option<Instant>,
    config_ack_due: Option<Instant>,
}

impl DeviceCore {
    #[must_use]
    pub fn new(config: DeviceConfig) -> Self {
        Self {
            config,
            online: false,
            talking: false,
            uptime: 0,
            wifi_signal: INITIAL_WIFI_SIGNAL,
            last_message: String::new(),
            flow: ConversationFlow::new(),
            flow_due: None,
            config_ack_due: None,
        }
    }

    /// Transport came up: mark online and produce the handshake.
    pub fn on_connected(&mut self) -> LinkMessage {
        self.online = true;
        LinkMessage::handshake(ClientRole::Esp32Device, Some(&self.config.device_id))
    }

    /// Transport went down: drop any in-flight exchange and pending acks.
    pub fn on_disconnected(&mut self) {
        self.online = false;
        self.talking = false;
        self.flow.cancel();
        self.flow_due = None;
        self.config_ack_due = None;
    }

    /// Handle one inbound message from the relay.
    pub fn on_message(&mut self, msg: &LinkMessage, now: Instant) -> Vec<LinkMessage> {
        match msg.kind {
            // Acknowledged: push the initial status snapshot.
            MessageKind::HandshakeAck => vec![self.status_message()],
            MessageKind::AiConfig => {
                info!(config = ?msg.data, "simulator: configuration received");
                self.config_ack_due = Some(now + CONFIG_ACK_DELAY);
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    /// Heartbeat cadence: bump uptime, jitter the Wi-Fi signal, and push
    /// both the heartbeat and a status snapshot.
    pub fn on_heartbeat_tick(&mut self, rng: &mut impl Rng) -> Vec<LinkMessage> {
        self.uptime += 5;
        self.wifi_signal = rng.random_range(-50..=-40);
        let hb = Heartbeat {
            device_id: self.config.device_id.clone(),
            uptime: self.uptime,
            wifi_signal: self.wifi_signal,
        };
        vec![LinkMessage::heartbeat(&hb), self.status_message()]
    }

    /// Conversation cadence: occasionally start a scripted exchange.
    pub fn on_conversation_tick(&mut self, now: Instant, rng: &mut impl Rng) -> Vec<LinkMessage> {
        if !self.flow.is_idle() {
            return Vec::new();
        }
        if rng.random::<f64>() >= self.config.conversation_chance {
            return Vec::new();
        }
        let (user, assistant) = SCRIPTS[rng.random_range(0..SCRIPTS.len())];
        self.start_conversation(Exchange::new(user, assistant), now)
    }

    /// Start an exchange now. Returns nothing if one is already live.
    pub fn start_conversation(&mut self, exchange: Exchange, now: Instant) -> Vec<LinkMessage> {
        let Some(step) = self.flow.begin(exchange) else {
            return Vec::new();
        };
        self.apply_step(step, now)
    }

    /// Local override of the online flag; always pushes a status.
    pub fn set_online(&mut self, online: bool) -> LinkMessage {
        self.online = online;
        self.status_message()
    }

    /// Earliest pending deadline, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.flow_due.into_iter().chain(self.config_ack_due).min()
    }

    /// Fire whatever is due at `now`.
    pub fn poll_due(&mut self, now: Instant) -> Vec<LinkMessage> {
        let mut out = Vec::new();

        if self.config_ack_due.is_some_and(|at| now >= at) {
            self.config_ack_due = None;
            out.push(LinkMessage::config_result(&ConfigResult {
                success: true,
                message: "configuration updated".into(),
            }));
        }

        if self.flow_due.is_some_and(|at| now >= at) {
            self.flow_due = None;
            let step = self.flow.advance();
            out.extend(self.apply_step(step, now));
        }

        out
    }

    #[must_use]
    pub fn status(&self) -> AiStatus {
        AiStatus {
            online: self.online,
            talking: self.talking,
            wifi_signal: self.wifi_signal,
            uptime: self.uptime,
            last_message: self.last_message.clone(),
        }
    }

    #[must_use]
    pub fn is_talking(&self) -> bool {
        self.talking
    }

    fn status_message(&self) -> LinkMessage {
        LinkMessage::status(&self.status())
    }

    fn apply_step(&mut self, step: Step, now: Instant) -> Vec<LinkMessage> {
        let mut out = Vec::new();
        for event in step.events {
            match event {
                FlowEvent::TalkingStarted => {
                    self.talking = true;
                    out.push(self.status_message());
                }
                FlowEvent::UserUtterance(text) => {
                    out.push(LinkMessage::conversation(&ConversationMessage {
                        role: Role::User,
                        text,
                        timestamp: Some(now_ms()),
                    }));
                }
                FlowEvent::AssistantUtterance(text) => {
                    out.push(LinkMessage::conversation(&ConversationMessage {
                        role: Role::Assistant,
                        text,
                        timestamp: Some(now_ms()),
                    }));
                }
                FlowEvent::TalkingStopped { last_message } => {
                    self.talking = false;
                    self.last_message = last_message;
                    out.push(self.status_message());
                }
            }
        }
        self.flow_due = step.delay.map(|delay| now + delay);
        out
    }
}

// =============================================================================
// DRIVER
// =============================================================================

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, tungstenite::Message>;

/// Run one simulator session against the relay. Returns when the
/// connection closes or errors; the simulator does not reconnect.
pub async fn run(config: DeviceConfig) {
    let mut core = DeviceCore::new(config.clone());

    let (ws, _) = match connect_async(&config.server_url).await {
        Ok(conn) => conn,
        Err(e) => {
            warn!(url = %config.server_url, error = %e, "simulator: connect failed");
            return;
        }
    };
    info!(url = %config.server_url, "simulator: connected");

    let (mut write, mut read) = ws.split();
    let hello = core.on_connected();
    if send_message(&mut write, &hello).await.is_err() {
        return;
    }

    let mut heartbeat = interval_after(config.heartbeat_interval);
    let mut conversation = interval_after(config.conversation_interval);
    let mut rng = StdRng::from_os_rng();

    loop {
        let due = core.next_deadline();
        let outgoing = tokio::select! {
            inbound = read.next() => {
                match inbound {
                    Some(Ok(tungstenite::Message::Text(text))) => {
                        match serde_json::from_str::<LinkMessage>(&text) {
                            Ok(msg) => core.on_message(&msg, Instant::now()),
                            Err(e) => {
                                warn!(error = %e, "simulator: malformed message dropped");
                                Vec::new()
                            }
                        }
                    }
                    Some(Ok(tungstenite::Message::Close(_))) | None => break,
                    Some(Ok(_)) => Vec::new(),
                    Some(Err(e)) => {
                        warn!(error = %e, "simulator: socket error");
                        break;
                    }
                }
            }
            _ = heartbeat.tick() => core.on_heartbeat_tick(&mut rng),
            _ = conversation.tick() => core.on_conversation_tick(Instant::now(), &mut rng),
            () = wait_until(due) => core.poll_due(Instant::now()),
        };

        for msg in outgoing {
            if send_message(&mut write, &msg).await.is_err() {
                core.on_disconnected();
                return;
            }
        }
    }

    core.on_disconnected();
    info!("simulator: link closed");
}

/// Interval whose first tick fires one period from now, not immediately.
fn interval_after(period: Duration) -> tokio::time::Interval {
    tokio::time::interval_at(tokio::time::Instant::now() + period, period)
}

/// Sleep until the deadline; pend forever when there is none.
async fn wait_until(due: Option<Instant>) {
    match due {
        Some(at) => {
            let now = Instant::now();
            if at > now {
                tokio::time::sleep(at - now).await;
            }
        }
        None => std::future::pending::<()>().await,
    }
}

async fn send_message(write: &mut WsSink, msg: &LinkMessage) -> Result<(), ()> {
    let json = match serde_json::to_string(msg) {
        Ok(json) => json,
        Err(e) => {
            warn!(error = %e, "simulator: failed to serialize message");
            return Err(());
        }
    };
    write.send(tungstenite::Message::Text(json.into())).await.map_err(|e| {
        warn!(error = %e, "simulator: send failed");
    })
}

#[cfg(test)]
#[path = "simulator_test.rs"]
mod tests;
