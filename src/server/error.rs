//! HTTP error mapping and the validating JSON extractor

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::pipeline::PipelineError;
use crate::report::ReportError;
use crate::storage::StoreError;
use crate::validation::{FieldError, Schema, ValidationErrors};

/// Error body: `{ error, details }`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub details: ErrorDetails,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ErrorDetails {
    Fields(Vec<FieldError>),
    Message(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => ApiError::NotFound(err.to_string()),
            StoreError::Transition(_)
            | StoreError::ProgressRegression { .. }
            | StoreError::UnexpectedStatus { .. } => ApiError::Conflict(err.to_string()),
            StoreError::Io { .. } | StoreError::Corrupt { .. } | StoreError::Json(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Store(e) => e.into(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Validation(errors) => ErrorBody {
                error: "Validation failed".to_string(),
                details: ErrorDetails::Fields(errors.errors().to_vec()),
            },
            ApiError::NotFound(message) => ErrorBody {
                error: "Not found".to_string(),
                details: ErrorDetails::Message(message),
            },
            ApiError::Conflict(message) => ErrorBody {
                error: "Conflict".to_string(),
                details: ErrorDetails::Message(message),
            },
            ApiError::Internal(message) => {
                log::error!("Request failed: {}", message);
                ErrorBody {
                    error: "Internal server error".to_string(),
                    details: ErrorDetails::Message(message),
                }
            }
        };
        (status, Json(body)).into_response()
    }
}

/// JSON body checked against its [`Schema`] before deserialization.
///
/// Malformed JSON and schema violations both become a 400 listing every
/// offending field.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: Schema + DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| ValidationErrors::single("body", rejection.body_text()))?;
        Ok(ValidatedJson(T::parse(&value)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::state_machine::StateTransitionError;
    use crate::models::SessionStatus;

    #[test]
    fn test_store_errors_map_to_status() {
        let not_found: ApiError = StoreError::NotFound("s1".to_string()).into();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let conflict: ApiError = StoreError::Transition(StateTransitionError::AlreadyTerminal(
            SessionStatus::Completed,
        ))
        .into();
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let regression: ApiError = StoreError::ProgressRegression {
            current: 50.0,
            requested: 10.0,
        }
        .into();
        assert_eq!(regression.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_validation_body_lists_fields() {
        let mut errors = ValidationErrors::new();
        errors.push("idea.title", "is required");
        errors.push("idea.description", "must be at least 10 characters");

        let response = ApiError::Validation(errors).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"], "Validation failed");
        assert_eq!(json["details"].as_array().unwrap().len(), 2);
        assert_eq!(json["details"][0]["field"], "idea.title");
    }

    #[test]
    fn test_internal_error_keeps_message_only() {
        let err: ApiError = PipelineError::MissingReport.into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("Pipeline finished without a report"));
    }
}
