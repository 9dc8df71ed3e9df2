// Agent roles, inter-agent messages and their persisted log form

use crate::validation::{ObjectValidator, Schema, ValidationErrors};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    Researcher,
    Ideator,
    Critic,
    Analyst,
    Writer,
}

impl AgentRole {
    /// Returns all roles in pipeline order
    pub fn all() -> &'static [AgentRole] {
        &[
            AgentRole::Researcher,
            AgentRole::Ideator,
            AgentRole::Critic,
            AgentRole::Analyst,
            AgentRole::Writer,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::Researcher => "researcher",
            AgentRole::Ideator => "ideator",
            AgentRole::Critic => "critic",
            AgentRole::Analyst => "analyst",
            AgentRole::Writer => "writer",
        }
    }

    pub fn names() -> [&'static str; 5] {
        ["researcher", "ideator", "critic", "analyst", "writer"]
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AgentRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "researcher" => Ok(AgentRole::Researcher),
            "ideator" => Ok(AgentRole::Ideator),
            "critic" => Ok(AgentRole::Critic),
            "analyst" => Ok(AgentRole::Analyst),
            "writer" => Ok(AgentRole::Writer),
            _ => Err(format!(
                "Unknown agent role: '{}'. Expected one of: {}",
                s,
                AgentRole::names().join(", ")
            )),
        }
    }
}

/// A message emitted by one agent during a session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentMessage {
    pub agent: AgentRole,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl AgentMessage {
    pub fn new(agent: AgentRole, message: impl Into<String>) -> Self {
        Self {
            agent,
            message: message.into(),
            timestamp: Utc::now(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Field checks shared by `AgentMessage` and `AgentLog`
fn check_message_fields(v: &mut ObjectValidator<'_>) {
    v.one_of("agent", &AgentRole::names(), true);
    v.non_empty("message");
    v.datetime("timestamp", true);
}

impl Schema for AgentMessage {
    fn check(value: &Value) -> ValidationErrors {
        let mut v = ObjectValidator::new(value);
        check_message_fields(&mut v);
        v.finish()
    }
}

/// Persisted form of an `AgentMessage`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentLog {
    pub id: String,
    pub session_id: String,
    pub agent: AgentRole,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl AgentLog {
    pub fn from_message(session_id: &str, message: AgentMessage) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            agent: message.agent,
            message: message.message,
            timestamp: message.timestamp,
            data: message.data,
        }
    }

    pub fn to_message(&self) -> AgentMessage {
        AgentMessage {
            agent: self.agent,
            message: self.message.clone(),
            timestamp: self.timestamp,
            data: self.data.clone(),
        }
    }
}

impl Schema for AgentLog {
    fn check(value: &Value) -> ValidationErrors {
        let mut v = ObjectValidator::new(value);
        v.non_empty("id");
        v.non_empty("session_id");
        check_message_fields(&mut v);
        v.finish()
    }
}
