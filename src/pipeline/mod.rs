//! Stub ideation pipeline
//!
//! Drives one session through researching, generating and analyzing with the
//! stub agents, then stores the report and marks the session completed.
//! Every step is logged as an `AgentLog`, announced to subscribers and timed
//! in the metrics collector. A failed step moves the session to `error`.

pub mod agents;
pub mod fixtures;

pub use agents::{default_agents, AgentOutput, StubAgent};

use crate::events::EventNotifier;
use crate::ideas::{IdeaAnalysis, IdeaValidation};
use crate::metrics::MetricsCollector;
use crate::models::{
    AgentMessage, BusinessIdea, IdeationSession, SessionStatus, UpdateSessionInput,
    WebSearchQuery, WebSearchResult,
};
use crate::report::{HtmlReport, ReportError};
use crate::storage::{SessionStore, StoreError};
use crate::validation::ValidationErrors;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::task::JoinHandle;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("Agent produced invalid data: {0}")]
    InvalidData(#[from] ValidationErrors),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No ideas available to evaluate")]
    NoIdeas,

    #[error("Pipeline finished without a report")]
    MissingReport,
}

impl PipelineError {
    /// Machine readable code carried by `error` events
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::Store(_) => "STORE_ERROR",
            PipelineError::Report(_) => "REPORT_ERROR",
            PipelineError::InvalidData(_) => "INVALID_AGENT_DATA",
            PipelineError::Json(_) => "SERIALIZATION_ERROR",
            PipelineError::NoIdeas => "NO_IDEAS",
            PipelineError::MissingReport => "MISSING_REPORT",
        }
    }
}

/// State handed from one agent to the next
#[derive(Debug, Clone, Default)]
pub struct PipelineContext {
    pub session_id: String,
    pub search_query: Option<WebSearchQuery>,
    pub search_results: Vec<WebSearchResult>,
    pub ideas: Vec<BusinessIdea>,
    pub validations: Vec<IdeaValidation>,
    pub selected: Option<usize>,
    pub analysis: Option<IdeaAnalysis>,
    pub report: Option<HtmlReport>,
}

impl PipelineContext {
    pub fn new(session_id: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            ..Default::default()
        }
    }
}

pub struct IdeationPipeline {
    store: Arc<SessionStore>,
    notifier: Arc<dyn EventNotifier>,
    metrics: Arc<MetricsCollector>,
    agents: Vec<Box<dyn StubAgent>>,
    step_delay: Duration,
}

impl IdeationPipeline {
    pub fn new(
        store: Arc<SessionStore>,
        notifier: Arc<dyn EventNotifier>,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            store,
            notifier,
            metrics,
            agents: default_agents(),
            step_delay: Duration::ZERO,
        }
    }

    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay;
        self
    }

    /// Replace the agent line-up
    pub fn with_agents(mut self, agents: Vec<Box<dyn StubAgent>>) -> Self {
        self.agents = agents;
        self
    }

    /// Move an `initializing` session into `researching`.
    ///
    /// Fails with `StoreError::UnexpectedStatus` if the session was already
    /// started, so a session never runs twice.
    pub fn begin(&self, session_id: &str) -> Result<IdeationSession, PipelineError> {
        let change = self.store.update_from(
            session_id,
            SessionStatus::Initializing,
            UpdateSessionInput::status(SessionStatus::Researching).with_progress(0.0),
        )?;
        let session = change.current;
        self.notifier.send_phase_update(
            session_id,
            session.status,
            &session.current_phase,
            Some("Pipeline started".to_string()),
        );
        log::info!("Started pipeline for session {}", session_id);
        Ok(session)
    }

    /// Run the pipeline on a background task. Call [`begin`](Self::begin) first.
    pub fn spawn(self: Arc<Self>, session_id: String) -> JoinHandle<()> {
        tokio::spawn(async move {
            match self.run(&session_id).await {
                Ok(report) => log::info!(
                    "Pipeline finished for session {} (report {})",
                    session_id,
                    report.id
                ),
                Err(e) => self.fail(&session_id, &e),
            }
        })
    }

    /// Execute every agent in order and complete the session
    pub async fn run(&self, session_id: &str) -> Result<HtmlReport, PipelineError> {
        let started = Instant::now();
        let mut ctx = PipelineContext::new(session_id);
        let steps = self.agents.len().max(1);

        for (index, agent) in self.agents.iter().enumerate() {
            self.enter_phase(session_id, agent.phase())?;

            let step_started = Instant::now();
            let output = agent.run(&mut ctx)?;
            self.metrics
                .record(&format!("agent.{}", agent.role()), step_started.elapsed());

            let mut message = AgentMessage::new(agent.role(), output.message);
            if let Some(data) = output.data {
                message = message.with_data(data);
            }
            self.store.append_log(session_id, message.clone())?;
            self.notifier.send_agent_message(session_id, message);
            for idea in output.ideas {
                self.notifier.send_idea_generated(session_id, idea);
            }

            // The final step's progress is reported by completion
            if index + 1 < steps {
                let progress = ((index + 1) as f64 * 100.0 / steps as f64).round();
                self.store
                    .update(session_id, UpdateSessionInput::default().with_progress(progress))?;
                self.notifier.send_progress_update(
                    session_id,
                    progress,
                    Some(format!("{} finished", agent.role())),
                );
            }

            if !self.step_delay.is_zero() {
                tokio::time::sleep(self.step_delay).await;
            }
        }

        let report = ctx.report.take().ok_or(PipelineError::MissingReport)?;
        self.store.save_report(session_id, report.clone())?;

        let change = self.store.update(
            session_id,
            UpdateSessionInput::status(SessionStatus::Completed).with_progress(100.0),
        )?;
        self.notifier.send_progress_update(session_id, 100.0, None);
        self.notifier.send_phase_update(
            session_id,
            change.current.status,
            &change.current.current_phase,
            None,
        );
        self.notifier.send_complete(
            session_id,
            Some(report.id.clone()),
            Some(report.executive_summary.clone()),
        );
        self.notifier.close_connection(session_id);

        self.metrics.record("pipeline.run", started.elapsed());
        Ok(report)
    }

    fn enter_phase(&self, session_id: &str, phase: SessionStatus) -> Result<(), PipelineError> {
        let change = self
            .store
            .update(session_id, UpdateSessionInput::status(phase))?;
        if change.status_changed() {
            log::debug!("Session {} entered {}", session_id, phase);
            self.notifier.send_phase_update(
                session_id,
                change.current.status,
                &change.current.current_phase,
                None,
            );
        }
        Ok(())
    }

    /// Record a failure on the session and tell subscribers
    fn fail(&self, session_id: &str, error: &PipelineError) {
        log::error!("Pipeline failed for session {}: {}", session_id, error);
        let message = error.to_string();
        let update = UpdateSessionInput::status(SessionStatus::Error).with_error(message.clone());
        if let Err(e) = self.store.update(session_id, update) {
            log::warn!("Could not mark session {} as failed: {}", session_id, e);
        }
        self.notifier
            .send_error(session_id, &message, Some(error.code()));
        self.notifier.close_connection(session_id);
    }
}
