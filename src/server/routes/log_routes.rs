//! Agent log routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::events::EventNotifier;
use crate::models::{AgentLog, AgentMessage};
use crate::server::error::{ApiError, ValidatedJson};
use crate::server::AppState;

pub async fn list_logs(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<AgentLog>>, ApiError> {
    Ok(Json(state.store.logs(&id)?))
}

/// Append a log and forward it to live subscribers as `agent_message`
pub async fn append_log(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(message): ValidatedJson<AgentMessage>,
) -> Result<(StatusCode, Json<AgentLog>), ApiError> {
    let log_entry = state.store.append_log(&id, message)?;
    state
        .notifier
        .send_agent_message(&id, log_entry.to_message());
    Ok((StatusCode::CREATED, Json(log_entry)))
}
