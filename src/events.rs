// Session events and the notifier contract used to push them to subscribers
// Transports (WebSocket, SSE) deliver them as `{type, data, timestamp}` envelopes

use crate::models::{AgentMessage, BusinessIdea, SessionStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// Event type names on the wire
pub const EVENT_AGENT_MESSAGE: &str = "agent_message";
pub const EVENT_PHASE_UPDATE: &str = "phase_update";
pub const EVENT_PROGRESS_UPDATE: &str = "progress_update";
pub const EVENT_IDEA_GENERATED: &str = "idea_generated";
pub const EVENT_ERROR: &str = "error";
pub const EVENT_COMPLETE: &str = "complete";

/// Payload for phase transitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseUpdatePayload {
    pub status: SessionStatus,
    pub phase: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Payload for progress changes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdatePayload {
    pub progress: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Payload for ideas produced by the ideator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaGeneratedPayload {
    pub idea: BusinessIdea,
}

/// Payload for pipeline failures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Payload for session completion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Every event a session can emit. The set of variants is closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum SessionEvent {
    AgentMessage(AgentMessage),
    PhaseUpdate(PhaseUpdatePayload),
    ProgressUpdate(ProgressUpdatePayload),
    IdeaGenerated(IdeaGeneratedPayload),
    Error(ErrorPayload),
    Complete(CompletePayload),
}

impl SessionEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            SessionEvent::AgentMessage(_) => EVENT_AGENT_MESSAGE,
            SessionEvent::PhaseUpdate(_) => EVENT_PHASE_UPDATE,
            SessionEvent::ProgressUpdate(_) => EVENT_PROGRESS_UPDATE,
            SessionEvent::IdeaGenerated(_) => EVENT_IDEA_GENERATED,
            SessionEvent::Error(_) => EVENT_ERROR,
            SessionEvent::Complete(_) => EVENT_COMPLETE,
        }
    }

    /// True for events after which the session emits nothing further
    pub fn is_final(&self) -> bool {
        matches!(self, SessionEvent::Error(_) | SessionEvent::Complete(_))
    }
}

/// A timestamped event as delivered to subscribers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "WireEnvelope", try_from = "WireEnvelope")]
pub struct EventEnvelope {
    pub event: SessionEvent,
    pub timestamp: DateTime<Utc>,
}

impl EventEnvelope {
    pub fn new(event: SessionEvent) -> Self {
        Self {
            event,
            timestamp: Utc::now(),
        }
    }

    pub fn event_type(&self) -> &'static str {
        self.event.event_type()
    }
}

#[derive(Serialize, Deserialize)]
struct WireEnvelope {
    #[serde(rename = "type")]
    kind: String,
    data: Value,
    timestamp: DateTime<Utc>,
}

impl From<EventEnvelope> for WireEnvelope {
    fn from(envelope: EventEnvelope) -> Self {
        let kind = envelope.event_type().to_string();
        let data = match serde_json::to_value(&envelope.event) {
            Ok(Value::Object(mut map)) => map.remove("data").unwrap_or(Value::Null),
            _ => Value::Null,
        };
        Self {
            kind,
            data,
            timestamp: envelope.timestamp,
        }
    }
}

impl TryFrom<WireEnvelope> for EventEnvelope {
    type Error = String;

    fn try_from(wire: WireEnvelope) -> Result<Self, Self::Error> {
        let tagged = serde_json::json!({ "type": wire.kind, "data": wire.data });
        let event: SessionEvent = serde_json::from_value(tagged).map_err(|e| e.to_string())?;
        Ok(Self {
            event,
            timestamp: wire.timestamp,
        })
    }
}

/// Pushes session events to whatever transport holds the live connections.
///
/// Delivery is at-most-once to subscribers connected at send time, FIFO per
/// session. Sends after `close_connection` are silent no-ops. Each send
/// returns the number of subscribers reached.
pub trait EventNotifier: Send + Sync {
    fn send_message(&self, session_id: &str, event: SessionEvent) -> usize;

    fn close_connection(&self, session_id: &str);

    fn send_agent_message(&self, session_id: &str, message: AgentMessage) -> usize {
        self.send_message(session_id, SessionEvent::AgentMessage(message))
    }

    fn send_phase_update(
        &self,
        session_id: &str,
        status: SessionStatus,
        phase: &str,
        description: Option<String>,
    ) -> usize {
        self.send_message(
            session_id,
            SessionEvent::PhaseUpdate(PhaseUpdatePayload {
                status,
                phase: phase.to_string(),
                description,
            }),
        )
    }

    fn send_progress_update(&self, session_id: &str, progress: f64, message: Option<String>) -> usize {
        self.send_message(
            session_id,
            SessionEvent::ProgressUpdate(ProgressUpdatePayload { progress, message }),
        )
    }

    fn send_idea_generated(&self, session_id: &str, idea: BusinessIdea) -> usize {
        self.send_message(
            session_id,
            SessionEvent::IdeaGenerated(IdeaGeneratedPayload { idea }),
        )
    }

    fn send_error(&self, session_id: &str, message: &str, code: Option<&str>) -> usize {
        self.send_message(
            session_id,
            SessionEvent::Error(ErrorPayload {
                message: message.to_string(),
                code: code.map(str::to_string),
            }),
        )
    }

    fn send_complete(
        &self,
        session_id: &str,
        report_id: Option<String>,
        summary: Option<String>,
    ) -> usize {
        self.send_message(
            session_id,
            SessionEvent::Complete(CompletePayload { report_id, summary }),
        )
    }
}
