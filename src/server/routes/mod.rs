//! REST routes, grouped by resource:
//! - idea_routes: idea scoring
//! - session_routes: session CRUD and pipeline start
//! - log_routes: agent logs of a session
//! - report_routes: generated report as JSON or HTML
//! - metrics_routes: performance metrics

pub mod idea_routes;
pub mod log_routes;
pub mod metrics_routes;
pub mod report_routes;
pub mod session_routes;

use axum::{
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::events::sse_handler;
use super::AppState;

/// Success envelope used by the idea endpoint
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            timestamp: Utc::now(),
        }
    }
}

/// Every route under `/api`
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/api/ideas/validate", post(idea_routes::validate_idea))
        .route(
            "/api/sessions",
            get(session_routes::list_sessions).post(session_routes::create_session),
        )
        .route(
            "/api/sessions/:id",
            get(session_routes::get_session)
                .patch(session_routes::update_session)
                .delete(session_routes::delete_session),
        )
        .route("/api/sessions/:id/start", post(session_routes::start_session))
        .route(
            "/api/sessions/:id/logs",
            get(log_routes::list_logs).post(log_routes::append_log),
        )
        .route("/api/sessions/:id/report", get(report_routes::get_report))
        .route("/api/sessions/:id/report/html", get(report_routes::get_report_html))
        .route("/api/sessions/:id/events", get(sse_handler))
        .route(
            "/api/metrics",
            get(metrics_routes::get_metrics).delete(metrics_routes::reset_metrics),
        )
}
