// Ideation session records and their request shapes

use crate::validation::{ObjectValidator, Schema, ValidationErrors};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Initializing,
    Researching,
    Generating,
    Analyzing,
    Completed,
    Error,
}

impl SessionStatus {
    /// Returns all statuses in pipeline order
    pub fn all() -> &'static [SessionStatus] {
        &[
            SessionStatus::Initializing,
            SessionStatus::Researching,
            SessionStatus::Generating,
            SessionStatus::Analyzing,
            SessionStatus::Completed,
            SessionStatus::Error,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Initializing => "initializing",
            SessionStatus::Researching => "researching",
            SessionStatus::Generating => "generating",
            SessionStatus::Analyzing => "analyzing",
            SessionStatus::Completed => "completed",
            SessionStatus::Error => "error",
        }
    }

    /// Wire names, for schema checks and error messages
    pub fn names() -> [&'static str; 6] {
        [
            "initializing",
            "researching",
            "generating",
            "analyzing",
            "completed",
            "error",
        ]
    }

    /// Human readable phase label used when a caller does not supply one
    pub fn default_phase_label(&self) -> &'static str {
        match self {
            SessionStatus::Initializing => "Initializing session",
            SessionStatus::Researching => "Market research",
            SessionStatus::Generating => "Idea generation",
            SessionStatus::Analyzing => "Critique and analysis",
            SessionStatus::Completed => "Report ready",
            SessionStatus::Error => "Failed",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SessionStatus::all()
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "Unknown session status: '{}'. Expected one of: {}",
                    s,
                    SessionStatus::names().join(", ")
                )
            })
    }
}

/// One end-to-end run of the ideation pipeline for a user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IdeationSession {
    pub id: String,
    pub user_id: String,
    pub status: SessionStatus,
    pub current_phase: String,
    /// Percentage in [0, 100]
    pub progress: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl IdeationSession {
    /// Build a fresh session in the `initializing` state
    pub fn new(input: CreateSessionInput) -> Self {
        let now = Utc::now();
        let current_phase = input
            .current_phase
            .unwrap_or_else(|| SessionStatus::Initializing.default_phase_label().to_string());
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: input.user_id,
            status: SessionStatus::Initializing,
            current_phase,
            progress: 0.0,
            created_at: now,
            updated_at: now,
            completed_at: None,
            error_message: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        super::state_machine::is_terminal_state(self.status)
    }
}

impl Schema for IdeationSession {
    fn check(value: &Value) -> ValidationErrors {
        let mut v = ObjectValidator::new(value);
        v.non_empty("id");
        v.non_empty("user_id");
        v.one_of("status", &SessionStatus::names(), true);
        v.string("current_phase");
        v.number("progress", 0.0, 100.0, true);
        v.datetime("created_at", true);
        v.datetime("updated_at", true);
        v.datetime("completed_at", false);
        v.opt_string("error_message");
        v.finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateSessionInput {
    pub user_id: String,
    #[serde(default)]
    pub current_phase: Option<String>,
}

impl Schema for CreateSessionInput {
    fn check(value: &Value) -> ValidationErrors {
        let mut v = ObjectValidator::new(value);
        v.non_empty("user_id");
        v.text("current_phase", 1, 200, false);
        v.finish()
    }
}

/// Partial update; absent fields are left unchanged by the store
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UpdateSessionInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SessionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_phase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl UpdateSessionInput {
    pub fn status(status: SessionStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.current_phase = Some(phase.into());
        self
    }

    pub fn with_progress(mut self, progress: f64) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.current_phase.is_none()
            && self.progress.is_none()
            && self.completed_at.is_none()
            && self.error_message.is_none()
    }
}

impl Schema for UpdateSessionInput {
    fn check(value: &Value) -> ValidationErrors {
        let mut v = ObjectValidator::new(value);
        v.one_of("status", &SessionStatus::names(), false);
        v.opt_string("current_phase");
        v.number("progress", 0.0, 100.0, false);
        v.datetime("completed_at", false);
        v.opt_string("error_message");
        v.finish()
    }
}
