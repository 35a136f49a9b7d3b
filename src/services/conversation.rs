//! Conversation flow — the turn-taking state machine of a simulated
//! exchange.
//!
//! DESIGN
//! ======
//! `Idle → UserSpeaking → Thinking → AssistantSpeaking → Idle`, driven by a
//! single scheduled delay per transition instead of nested timer callbacks.
//! The machine emits events and the next delay; the owner schedules the
//! delay and calls `advance` when it elapses. Cancellation drops back to
//! `Idle` and no later `advance` can emit anything from the abandoned
//! exchange.
//!
//! An exchange is exactly one user utterance followed by one assistant
//! utterance, with a talking edge on each side.

use std::time::Duration;

/// Delay between the talking edge and the user utterance.
pub const USER_DELAY: Duration = Duration::from_millis(500);

/// Thinking time between the user utterance and the assistant reply.
pub const THINKING_DELAY: Duration = Duration::from_millis(1000);

/// Delay between the assistant reply and the closing talking edge.
pub const WRAP_UP_DELAY: Duration = Duration::from_millis(500);

/// One scripted exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub user: String,
    pub assistant: String,
}

impl Exchange {
    #[must_use]
    pub fn new(user: impl Into<String>, assistant: impl Into<String>) -> Self {
        Self { user: user.into(), assistant: assistant.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    UserSpeaking,
    Thinking,
    AssistantSpeaking,
}

/// Something the owner must act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowEvent {
    /// The device started talking; push a status with `talking = true`.
    TalkingStarted,
    UserUtterance(String),
    AssistantUtterance(String),
    /// The exchange is over; `last_message` is the assistant's text.
    TalkingStopped { last_message: String },
}

/// Result of one transition: events to act on and the delay until the next
/// `advance`, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub events: Vec<FlowEvent>,
    pub delay: Option<Duration>,
}

#[derive(Debug, Default)]
pub struct ConversationFlow {
    phase: Phase,
    exchange: Option<Exchange>,
}

impl ConversationFlow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    /// Start an exchange. Returns `None` while another exchange is live.
    pub fn begin(&mut self, exchange: Exchange) -> Option<Step> {
        if !self.is_idle() {
            return None;
        }
        self.phase = Phase::UserSpeaking;
        self.exchange = Some(exchange);
        Some(Step { events: vec![FlowEvent::TalkingStarted], delay: Some(USER_DELAY) })
    }

    /// Take the next transition. Calling this while idle is a harmless
    /// no-op (empty step, no delay).
    pub fn advance(&mut self) -> Step {
        match self.phase {
            Phase::Idle => Step { events: Vec::new(), delay: None },
            Phase::UserSpeaking => {
                self.phase = Phase::Thinking;
                let user = self.exchange.as_ref().map(|e| e.user.clone()).unwrap_or_default();
                Step { events: vec![FlowEvent::UserUtterance(user)], delay: Some(THINKING_DELAY) }
            }
            Phase::Thinking => {
                self.phase = Phase::AssistantSpeaking;
                let assistant =
                    self.exchange.as_ref().map(|e| e.assistant.clone()).unwrap_or_default();
                Step {
                    events: vec![FlowEvent::AssistantUtterance(assistant)],
                    delay: Some(WRAP_UP_DELAY),
                }
            }
            Phase::AssistantSpeaking => {
                self.phase = Phase::Idle;
                let last_message =
                    self.exchange.take().map(|e| e.assistant).unwrap_or_default();
                Step { events: vec![FlowEvent::TalkingStopped { last_message }], delay: None }
            }
        }
    }

    /// Abandon the live exchange. No further events are emitted for it.
    pub fn cancel(&mut self) {
        self.phase = Phase::Idle;
        self.exchange = None;
    }
}

#[cfg(test)]
#[path = "conversation_test.rs"]
mod tests;
