//! `POST /api/ideas/validate`

use axum::{extract::State, Json};
use serde::Serialize;

use super::ApiResponse;
use crate::ideas::{
    analyze_strengths_and_weaknesses, validate_idea as score_idea, IdeaAnalysis, IdeaValidation,
    ValidateIdeaRequest,
};
use crate::server::error::ValidatedJson;
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct IdeaValidationData {
    pub validation: IdeaValidation,
    /// `null` unless analysis was requested
    pub analysis: Option<IdeaAnalysis>,
}

pub async fn validate_idea(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ValidateIdeaRequest>,
) -> Json<ApiResponse<IdeaValidationData>> {
    let data = state.metrics.time("ideas.validate", || {
        let validation = score_idea(&request.idea);
        let analysis = request
            .wants_analysis()
            .then(|| analyze_strengths_and_weaknesses(&request.idea, &validation));
        IdeaValidationData {
            validation,
            analysis,
        }
    });

    log::debug!(
        "Scored idea '{}': {} (viable: {})",
        request.idea.title,
        data.validation.score,
        data.validation.is_viable
    );
    Json(ApiResponse::ok(data))
}
