//! Session store
//!
//! Sessions, their agent logs and their report live in memory. With a data
//! directory configured, every mutation is also written to
//! `<data_dir>/sessions/<id>.json` and the directory is reloaded on startup.

pub mod files;

use crate::models::state_machine::{transition_state, StateTransitionError};
use crate::models::{
    AgentLog, AgentMessage, CreateSessionInput, IdeationSession, SessionStatus,
    UpdateSessionInput,
};
use crate::report::HtmlReport;
use crate::utils::{read_lock_recover, session_file, sessions_dir, write_lock_recover};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Session not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Transition(#[from] StateTransitionError),

    #[error("Session is {actual}, expected {expected}")]
    UnexpectedStatus {
        expected: SessionStatus,
        actual: SessionStatus,
    },

    #[error("Progress cannot decrease from {current} to {requested}")]
    ProgressRegression { current: f64, requested: f64 },

    #[error("I/O error at {path}: {message}")]
    Io { path: String, message: String },

    #[error("Corrupt session file {path}: {message}")]
    Corrupt { path: String, message: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    fn io(path: &Path, err: std::io::Error) -> Self {
        StoreError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}

/// Everything persisted for one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session: IdeationSession,
    #[serde(default)]
    pub logs: Vec<AgentLog>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<HtmlReport>,
}

/// Before/after pair returned by [`SessionStore::update`]
#[derive(Debug, Clone)]
pub struct SessionChange {
    pub previous: IdeationSession,
    pub current: IdeationSession,
}

impl SessionChange {
    pub fn status_changed(&self) -> bool {
        self.previous.status != self.current.status
    }

    pub fn progress_changed(&self) -> bool {
        self.previous.progress != self.current.progress
    }

    pub fn phase_changed(&self) -> bool {
        self.previous.current_phase != self.current.current_phase
    }
}

#[derive(Debug, Clone, Default)]
pub struct StoreOptions {
    pub data_dir: Option<PathBuf>,
    pub enforce_monotonic_progress: bool,
}

pub struct SessionStore {
    records: RwLock<HashMap<String, SessionRecord>>,
    options: StoreOptions,
}

impl SessionStore {
    pub fn in_memory() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            options: StoreOptions::default(),
        }
    }

    /// Open a store, loading any sessions already saved under the data dir
    pub fn open(options: StoreOptions) -> Result<Self, StoreError> {
        let mut records = HashMap::new();
        if let Some(data_dir) = &options.data_dir {
            let dir = sessions_dir(data_dir);
            files::ensure_dir(&dir)?;
            let entries = std::fs::read_dir(&dir).map_err(|e| StoreError::io(&dir, e))?;
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }
                match files::read_json::<SessionRecord>(&path) {
                    Ok(record) => {
                        records.insert(record.session.id.clone(), record);
                    }
                    Err(e) => log::warn!("Skipping session file: {}", e),
                }
            }
            log::info!("Loaded {} session(s) from {}", records.len(), dir.display());
        }
        Ok(Self {
            records: RwLock::new(records),
            options,
        })
    }

    pub fn is_persistent(&self) -> bool {
        self.options.data_dir.is_some()
    }

    fn persist(&self, record: &SessionRecord) -> Result<(), StoreError> {
        match &self.options.data_dir {
            Some(dir) => files::write_json(&session_file(dir, &record.session.id), record),
            None => Ok(()),
        }
    }

    pub fn create(&self, input: CreateSessionInput) -> Result<IdeationSession, StoreError> {
        let session = IdeationSession::new(input);
        let record = SessionRecord {
            session: session.clone(),
            logs: Vec::new(),
            report: None,
        };
        let mut records = write_lock_recover(&self.records);
        self.persist(&record)?;
        records.insert(session.id.clone(), record);
        log::info!("Created session {} for user {}", session.id, session.user_id);
        Ok(session)
    }

    pub fn get(&self, id: &str) -> Result<IdeationSession, StoreError> {
        read_lock_recover(&self.records)
            .get(id)
            .map(|r| r.session.clone())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Newest first, optionally restricted to one user
    pub fn list(&self, user_id: Option<&str>) -> Vec<IdeationSession> {
        let mut sessions: Vec<IdeationSession> = read_lock_recover(&self.records)
            .values()
            .filter(|r| user_id.map_or(true, |u| r.session.user_id == u))
            .map(|r| r.session.clone())
            .collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        sessions
    }

    /// Apply a partial update through the status state machine
    pub fn update(&self, id: &str, input: UpdateSessionInput) -> Result<SessionChange, StoreError> {
        self.apply_update(id, None, input)
    }

    /// Like [`update`](Self::update), but only if the session is currently
    /// in `expected` status. The check and the write happen under one lock.
    pub fn update_from(
        &self,
        id: &str,
        expected: SessionStatus,
        input: UpdateSessionInput,
    ) -> Result<SessionChange, StoreError> {
        self.apply_update(id, Some(expected), input)
    }

    fn apply_update(
        &self,
        id: &str,
        expected: Option<SessionStatus>,
        input: UpdateSessionInput,
    ) -> Result<SessionChange, StoreError> {
        let mut records = write_lock_recover(&self.records);
        let record = records
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let previous = record.session.clone();
        if let Some(expected) = expected {
            if previous.status != expected {
                return Err(StoreError::UnexpectedStatus {
                    expected,
                    actual: previous.status,
                });
            }
        }
        let mut next = previous.clone();

        if let Some(status) = input.status {
            next.status = transition_state(previous.status, status)?;
            if next.status != previous.status && input.current_phase.is_none() {
                next.current_phase = next.status.default_phase_label().to_string();
            }
        }
        if let Some(phase) = input.current_phase {
            next.current_phase = phase;
        }
        if let Some(progress) = input.progress {
            if progress < previous.progress {
                if self.options.enforce_monotonic_progress {
                    return Err(StoreError::ProgressRegression {
                        current: previous.progress,
                        requested: progress,
                    });
                }
                log::warn!(
                    "Session {} progress decreased from {} to {}",
                    id,
                    previous.progress,
                    progress
                );
            }
            next.progress = progress;
        }
        if let Some(message) = input.error_message {
            next.error_message = Some(message);
        }
        if let Some(completed_at) = input.completed_at {
            next.completed_at = Some(completed_at);
        }
        if next.status == SessionStatus::Completed && next.completed_at.is_none() {
            next.completed_at = Some(Utc::now());
        }

        if next != previous {
            if previous.is_terminal() {
                return Err(StateTransitionError::AlreadyTerminal(previous.status).into());
            }
            next.updated_at = Utc::now();
            let mut updated = record.clone();
            updated.session = next.clone();
            self.persist(&updated)?;
            *record = updated;
        }

        Ok(SessionChange {
            previous,
            current: next,
        })
    }

    /// Remove a session together with its logs and report
    pub fn delete(&self, id: &str) -> Result<IdeationSession, StoreError> {
        let mut records = write_lock_recover(&self.records);
        let record = records
            .remove(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if let Some(dir) = &self.options.data_dir {
            files::remove_file(&session_file(dir, id))?;
        }
        log::info!("Deleted session {}", id);
        Ok(record.session)
    }

    pub fn append_log(&self, session_id: &str, message: AgentMessage) -> Result<AgentLog, StoreError> {
        let mut records = write_lock_recover(&self.records);
        let record = records
            .get_mut(session_id)
            .ok_or_else(|| StoreError::NotFound(session_id.to_string()))?;
        let log_entry = AgentLog::from_message(session_id, message);
        record.logs.push(log_entry.clone());
        if let Err(e) = self.persist(record) {
            record.logs.pop();
            return Err(e);
        }
        Ok(log_entry)
    }

    /// Agent logs in insertion order
    pub fn logs(&self, session_id: &str) -> Result<Vec<AgentLog>, StoreError> {
        read_lock_recover(&self.records)
            .get(session_id)
            .map(|r| r.logs.clone())
            .ok_or_else(|| StoreError::NotFound(session_id.to_string()))
    }

    pub fn save_report(&self, session_id: &str, report: HtmlReport) -> Result<(), StoreError> {
        let mut records = write_lock_recover(&self.records);
        let record = records
            .get_mut(session_id)
            .ok_or_else(|| StoreError::NotFound(session_id.to_string()))?;
        let previous = record.report.replace(report);
        if let Err(e) = self.persist(record) {
            record.report = previous;
            return Err(e);
        }
        Ok(())
    }

    pub fn report(&self, session_id: &str) -> Result<Option<HtmlReport>, StoreError> {
        read_lock_recover(&self.records)
            .get(session_id)
            .map(|r| r.report.clone())
            .ok_or_else(|| StoreError::NotFound(session_id.to_string()))
    }

    pub fn len(&self) -> usize {
        read_lock_recover(&self.records).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
