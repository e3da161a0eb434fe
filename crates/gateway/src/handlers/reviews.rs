//! Review submission handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use peerflow_common::{
    db::models::AssignmentKind,
    db::Repository,
    errors::{AppError, Result},
};
use peerflow_engine::{Readiness, ReviewIntake, ReviewNotes, RubricWeights, SubScores};

/// Request to submit a review
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitReviewRequest {
    pub reviewer_id: Uuid,

    /// peer, mentor, or admin; defaults to peer
    #[serde(default = "default_kind")]
    pub kind: AssignmentKind,

    /// Rubric sub-scores; any omitted score makes the review feedback-only
    #[serde(default)]
    pub scores: ScoresInput,

    #[validate(length(max = 10000))]
    pub strengths: Option<String>,

    #[validate(length(max = 10000))]
    pub improvements: Option<String>,

    #[validate(length(max = 10000))]
    pub suggestions: Option<String>,
}

fn default_kind() -> AssignmentKind {
    AssignmentKind::Peer
}

#[derive(Debug, Default, Deserialize)]
pub struct ScoresInput {
    pub functionality: Option<i32>,
    pub code_quality: Option<i32>,
    pub best_practices: Option<i32>,
    pub documentation: Option<i32>,
}

/// Response after a review is accepted
#[derive(Serialize)]
pub struct ReviewResponse {
    pub review_id: Uuid,
    pub submission_id: Uuid,
    pub reviewer_id: Uuid,
    pub kind: String,
    pub disposition: String,
    /// Rounded for presentation; stored at full precision
    pub overall_score: Option<i64>,
    pub readiness: Readiness,
}

/// Submit a review for a submission
pub async fn submit_review(
    State(state): State<AppState>,
    Path(submission_id): Path<Uuid>,
    Json(request): Json<SubmitReviewRequest>,
) -> Result<(StatusCode, Json<ReviewResponse>)> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let scores = SubScores::new(
        request.scores.functionality,
        request.scores.code_quality,
        request.scores.best_practices,
        request.scores.documentation,
    )?;

    let intake = ReviewIntake::new(
        Repository::new(state.db.clone()),
        state.notifier.clone(),
        RubricWeights::standard(),
        state.config.review.clone(),
    );

    let outcome = intake
        .submit_review(
            submission_id,
            request.reviewer_id,
            request.kind,
            scores,
            ReviewNotes {
                strengths: request.strengths,
                improvements: request.improvements,
                suggestions: request.suggestions,
            },
        )
        .await?;

    let review = outcome.review;

    Ok((
        StatusCode::CREATED,
        Json(ReviewResponse {
            review_id: review.id,
            submission_id: review.submission_id,
            reviewer_id: review.reviewer_id,
            kind: review.kind.clone(),
            disposition: review.disposition.clone(),
            overall_score: review.overall_rounded(),
            readiness: outcome.readiness,
        }),
    ))
}
