//! Session routes
//!
//! Handles: create, list, get, update, delete and start of ideation sessions.
//! Updates are announced on the session's event channel.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::events::EventNotifier;
use crate::models::{CreateSessionInput, IdeationSession, SessionStatus, UpdateSessionInput};
use crate::server::error::{ApiError, ValidatedJson};
use crate::server::AppState;
use crate::storage::SessionChange;

#[derive(Debug, Default, Deserialize)]
pub struct ListSessionsQuery {
    pub user_id: Option<String>,
}

pub async fn create_session(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateSessionInput>,
) -> Result<(StatusCode, Json<IdeationSession>), ApiError> {
    let session = state.store.create(input)?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn list_sessions(
    State(state): State<AppState>,
    Query(query): Query<ListSessionsQuery>,
) -> Json<Vec<IdeationSession>> {
    Json(state.store.list(query.user_id.as_deref()))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<IdeationSession>, ApiError> {
    Ok(Json(state.store.get(&id)?))
}

pub async fn update_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<UpdateSessionInput>,
) -> Result<Json<IdeationSession>, ApiError> {
    let change = state.store.update(&id, input)?;
    announce_change(&state, &id, &change)?;
    Ok(Json(change.current))
}

/// Emit the events implied by a session update
fn announce_change(state: &AppState, id: &str, change: &SessionChange) -> Result<(), ApiError> {
    let session = &change.current;
    let notifier = &state.notifier;

    if change.status_changed() {
        notifier.send_phase_update(id, session.status, &session.current_phase, None);
    }
    if change.progress_changed() {
        notifier.send_progress_update(id, session.progress, None);
    }
    if !(change.status_changed() && session.is_terminal()) {
        return Ok(());
    }

    match session.status {
        SessionStatus::Completed => {
            let report_id = state.store.report(id)?.map(|report| report.id);
            notifier.send_complete(id, report_id, None);
        }
        SessionStatus::Error => {
            let message = session.error_message.as_deref().unwrap_or("Session failed");
            notifier.send_error(id, message, None);
        }
        _ => {}
    }
    notifier.close_connection(id);
    Ok(())
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.store.delete(&id)?;
    state.notifier.close_connection(&id);
    state.notifier.forget(&id);
    log::info!("Deleted session {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// Start the stub pipeline. Only an `initializing` session can be started.
pub async fn start_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<IdeationSession>), ApiError> {
    let session = state.pipeline.begin(&id)?;
    state.pipeline.clone().spawn(id);
    Ok((StatusCode::ACCEPTED, Json(session)))
}
