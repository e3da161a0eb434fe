//! Merge-readiness handler

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::AppState;
use peerflow_common::{
    db::Repository,
    errors::{AppError, Result},
};
use peerflow_engine::{readiness, Readiness};

#[derive(Serialize)]
pub struct ReadinessResponse {
    pub submission_id: Uuid,
    pub mentor_review_status: String,
    #[serde(flatten)]
    pub readiness: Readiness,
}

/// Report whether a submission has cleared review
pub async fn get_readiness(
    State(state): State<AppState>,
    Path(submission_id): Path<Uuid>,
) -> Result<Json<ReadinessResponse>> {
    let repo = Repository::new(state.db.clone());

    let submission = repo
        .find_submission_by_id(submission_id)
        .await?
        .ok_or_else(|| AppError::SubmissionNotFound {
            id: submission_id.to_string(),
        })?;

    Ok(Json(ReadinessResponse {
        submission_id,
        mentor_review_status: submission.mentor_review_status.clone(),
        readiness: readiness::evaluate(&submission),
    }))
}
