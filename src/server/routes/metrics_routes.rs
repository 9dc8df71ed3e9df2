//! Performance metrics routes

use axum::{extract::State, http::StatusCode, Json};

use crate::metrics::MetricsSnapshot;
use crate::server::AppState;

pub async fn get_metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

pub async fn reset_metrics(State(state): State<AppState>) -> StatusCode {
    state.metrics.reset();
    log::info!("Metrics reset");
    StatusCode::NO_CONTENT
}
