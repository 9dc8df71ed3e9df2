//! Report routes

use axum::{
    extract::{Path, State},
    response::Html,
    Json,
};

use crate::report::HtmlReport;
use crate::server::error::ApiError;
use crate::server::AppState;

fn load_report(state: &AppState, id: &str) -> Result<HtmlReport, ApiError> {
    state
        .store
        .report(id)?
        .ok_or_else(|| ApiError::NotFound(format!("Report not generated yet for session {}", id)))
}

pub async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<HtmlReport>, ApiError> {
    Ok(Json(load_report(&state, &id)?))
}

pub async fn get_report_html(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, ApiError> {
    let report = load_report(&state, &id)?;
    let html = state
        .metrics
        .time("report.render", || state.renderer.render(&report))?;
    Ok(Html(html))
}
