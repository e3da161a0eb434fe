//! Assignment handlers

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
    db::models::{Assignment, AssignmentStatus},
    db::Repository,
    errors::{AppError, Result},
};
use peerflow_engine::{lifecycle, AssignmentEngine};

/// Request to assign peer reviewers to a submission
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CreateAssignmentsRequest {
    /// How many reviewers to assign; defaults to the configured count
    #[validate(range(min = 1, max = 10))]
    #[serde(default)]
    pub reviewer_count: Option<usize>,
}

#[derive(Serialize)]
pub struct AssignmentView {
    pub id: Uuid,
    pub submission_id: Uuid,
    pub reviewer_id: Uuid,
    pub kind: String,
    pub status: String,
    pub due_at: String,
}

impl From<Assignment> for AssignmentView {
    fn from(a: Assignment) -> Self {
        Self {
            id: a.id,
            submission_id: a.submission_id,
            reviewer_id: a.reviewer_id,
            kind: a.kind,
            status: a.status,
            due_at: a.due_at.to_rfc3339(),
        }
    }
}

/// Response after an assignment batch
#[derive(Serialize)]
pub struct AssignmentBatchResponse {
    pub requested: usize,
    pub created: usize,
    pub assignments: Vec<AssignmentView>,
}

/// Assign peer reviewers to a submission.
///
/// Partial success is normal: the response reports how many assignments
/// were actually created. Zero created is still a success when every
/// eligible reviewer already holds an assignment.
pub async fn create_assignments(
    State(state): State<AppState>,
    Path(submission_id): Path<Uuid>,
    Json(request): Json<CreateAssignmentsRequest>,
) -> Result<(StatusCode, Json<AssignmentBatchResponse>)> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let engine = AssignmentEngine::new(
        Repository::new(state.db.clone()),
        state.notifier.clone(),
        state.config.review.clone(),
    );

    let batch = engine
        .assign_reviewers(submission_id, request.reviewer_count)
        .await?;

    let status = if batch.created() > 0 {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(AssignmentBatchResponse {
            requested: batch.requested,
            created: batch.created(),
            assignments: batch.assignments.into_iter().map(Into::into).collect(),
        }),
    ))
}

/// Reviewer/administrator actions on an assignment
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionAction {
    Accept,
    Decline,
    Cancel,
}

impl TransitionAction {
    fn target(self) -> AssignmentStatus {
        match self {
            TransitionAction::Accept => AssignmentStatus::Accepted,
            TransitionAction::Decline => AssignmentStatus::Declined,
            TransitionAction::Cancel => AssignmentStatus::Cancelled,
        }
    }
}

/// Request to transition an assignment
#[derive(Debug, Deserialize, Validate)]
pub struct TransitionRequest {
    pub action: TransitionAction,

    /// Required when declining
    #[validate(length(max = 2000))]
    pub reason: Option<String>,
}

/// Accept, decline, or cancel an assignment. Repeating a transition the
/// assignment already holds is a no-op success.
pub async fn transition_assignment(
    State(state): State<AppState>,
    Path(assignment_id): Path<Uuid>,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<AssignmentView>> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let repo = Repository::new(state.db.clone());
    let assignment = lifecycle::respond(
        &repo,
        assignment_id,
        request.action.target(),
        request.reason,
    )
    .await?;

    Ok(Json(assignment.into()))
}

#[derive(Serialize)]
pub struct ExpireResponse {
    pub expired: u64,
}

/// Sweep every open assignment past its due date to expired. Called by the
/// external reminder/cron collaborator.
pub async fn expire_assignments(State(state): State<AppState>) -> Result<Json<ExpireResponse>> {
    let repo = Repository::new(state.db.clone());
    let expired = repo.expire_overdue(chrono::Utc::now()).await?;

    if expired > 0 {
        tracing::info!(expired, "Overdue assignments expired");
    }

    Ok(Json(ExpireResponse { expired }))
}
