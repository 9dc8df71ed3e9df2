//! Request timing middleware

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

use super::AppState;

/// Record each request's latency under `"<METHOD> <route pattern>"`
pub async fn record_timing(
    State(state): State<AppState>,
    matched: Option<MatchedPath>,
    req: Request,
    next: Next,
) -> Response {
    let route = matched
        .as_ref()
        .map(MatchedPath::as_str)
        .unwrap_or("unmatched");
    let operation = format!("{} {}", req.method(), route);

    let started = Instant::now();
    let response = next.run(req).await;
    state.metrics.record(&operation, started.elapsed());

    log::debug!(
        "{} -> {} in {:?}",
        operation,
        response.status(),
        started.elapsed()
    );
    response
}
