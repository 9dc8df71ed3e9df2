//! Server application state shared across handlers

use super::events::SessionBroadcaster;
use crate::config::AppConfig;
use crate::metrics::MetricsCollector;
use crate::pipeline::IdeationPipeline;
use crate::report::ReportRenderer;
use crate::shutdown::ShutdownState;
use crate::storage::{SessionStore, StoreOptions};
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,

    /// Sessions, agent logs and reports
    pub store: Arc<SessionStore>,

    /// Per-session event channels
    pub notifier: Arc<SessionBroadcaster>,

    pub metrics: Arc<MetricsCollector>,

    pub renderer: Arc<ReportRenderer>,

    /// Stub pipeline started by `POST /api/sessions/:id/start`
    pub pipeline: Arc<IdeationPipeline>,

    pub shutdown_state: ShutdownState,
}

impl AppState {
    /// Wire up every component from the configuration
    pub fn new(config: AppConfig, shutdown_state: ShutdownState) -> anyhow::Result<Self> {
        config.validate()?;

        let store = Arc::new(
            SessionStore::open(StoreOptions {
                data_dir: config.sessions.data_dir.clone(),
                enforce_monotonic_progress: config.sessions.enforce_monotonic_progress,
            })
            .context("Failed to open session store")?,
        );
        let notifier = Arc::new(SessionBroadcaster::new(config.events.channel_capacity));
        let metrics = Arc::new(MetricsCollector::new(config.metrics.max_samples_per_operation));
        let renderer = Arc::new(ReportRenderer::new().context("Failed to load report template")?);
        let pipeline = Arc::new(
            IdeationPipeline::new(store.clone(), notifier.clone(), metrics.clone())
                .with_step_delay(Duration::from_millis(config.pipeline.step_delay_ms)),
        );

        Ok(Self {
            config: Arc::new(config),
            store,
            notifier,
            metrics,
            renderer,
            pipeline,
            shutdown_state,
        })
    }
}
