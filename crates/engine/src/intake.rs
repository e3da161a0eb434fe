//! Scored review submission
//!
//! Validates one incoming review end to end, scores it, resolves the
//! matching assignment, and persists everything atomically. Notifications
//! (XP award to the reviewer, review-received to the author) go out only
//! after the write commits.

use crate::lifecycle::{self, CompletionAction};
use crate::readiness::{self, Readiness};
use crate::rubric::{RubricWeights, SubScores};
use crate::store::ReviewStore;
use chrono::{Duration, Utc};
use peerflow_common::config::ReviewConfig;
use peerflow_common::db::models::{
    AssignmentKind, Disposition, MentorReviewStatus, Review,
};
use peerflow_common::db::{AssignmentWrite, CounterWrite, NewReview, ReviewWrite};
use peerflow_common::errors::{AppError, Result};
use peerflow_common::metrics;
use peerflow_common::notify::{self, Notification, NotificationKind, Notifier};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Free-text feedback accompanying a review
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewNotes {
    pub strengths: Option<String>,
    pub improvements: Option<String>,
    pub suggestions: Option<String>,
}

/// Result of one accepted review
#[derive(Debug, Clone)]
pub struct IntakeOutcome {
    pub review: Review,
    pub readiness: Readiness,
}

/// Validates, scores, and persists incoming reviews
pub struct ReviewIntake<S> {
    store: S,
    notifier: Arc<dyn Notifier>,
    weights: RubricWeights,
    config: ReviewConfig,
}

impl<S: ReviewStore> ReviewIntake<S> {
    pub fn new(
        store: S,
        notifier: Arc<dyn Notifier>,
        weights: RubricWeights,
        config: ReviewConfig,
    ) -> Self {
        Self {
            store,
            notifier,
            weights,
            config,
        }
    }

    /// Submit one review.
    ///
    /// Mentor and admin reviews require an admin reviewer; a mentor review
    /// without a prior assignment synthesizes one at submission time. Peer
    /// reviews always require an existing assignment.
    pub async fn submit_review(
        &self,
        submission_id: Uuid,
        reviewer_id: Uuid,
        kind: AssignmentKind,
        scores: SubScores,
        notes: ReviewNotes,
    ) -> Result<IntakeOutcome> {
        let submission = self
            .store
            .find_submission(submission_id)
            .await?
            .ok_or_else(|| AppError::SubmissionNotFound {
                id: submission_id.to_string(),
            })?;

        if reviewer_id == submission.author_id {
            return Err(AppError::SelfReviewForbidden);
        }

        let reviewer = self
            .store
            .find_reviewer(reviewer_id)
            .await?
            .ok_or_else(|| AppError::ReviewerNotFound {
                id: reviewer_id.to_string(),
            })?;

        // Early duplicate check for a friendly error; the unique constraint
        // at insert time is the authoritative guard
        if let Some(existing) = self.store.find_review(submission_id, reviewer_id).await? {
            return Err(AppError::DuplicateReview {
                existing_review_id: existing.id,
            });
        }

        if matches!(kind, AssignmentKind::Mentor | AssignmentKind::Admin) && !reviewer.is_admin() {
            return Err(AppError::Forbidden {
                message: "mentor reviews require an administrator".to_string(),
            });
        }

        let outcome = self.weights.score(&scores);

        let assignment_write = match self.store.find_assignment(submission_id, reviewer_id).await? {
            Some(assignment) => match lifecycle::complete_for_review(assignment.assignment_status())? {
                CompletionAction::Complete => AssignmentWrite::Complete {
                    assignment_id: assignment.id,
                },
                CompletionAction::AlreadyCompleted => AssignmentWrite::None,
            },
            None if kind == AssignmentKind::Mentor => AssignmentWrite::SynthesizeMentor {
                priority: self.config.default_priority,
                due_at: Utc::now() + Duration::days(self.config.due_days),
            },
            None => {
                return Err(AppError::AssignmentNotFound {
                    id: format!("submission {} reviewer {}", submission_id, reviewer_id),
                })
            }
        };

        let counter_write = match kind {
            AssignmentKind::Peer => CounterWrite::IncrementPeerReviews,
            AssignmentKind::Mentor | AssignmentKind::Admin => match outcome.disposition {
                Disposition::Approved => {
                    CounterWrite::SetMentorStatus(MentorReviewStatus::Approved)
                }
                Disposition::Completed | Disposition::ChangesRequested => {
                    CounterWrite::SetMentorStatus(MentorReviewStatus::ChangesRequested)
                }
                // Feedback-only mentor review decides nothing yet
                Disposition::Pending => CounterWrite::None,
            },
        };

        let review = self
            .store
            .submit_review(ReviewWrite {
                review: NewReview {
                    submission_id,
                    reviewer_id,
                    kind,
                    functionality: scores.functionality,
                    code_quality: scores.code_quality,
                    best_practices: scores.best_practices,
                    documentation: scores.documentation,
                    overall_score: outcome.overall,
                    disposition: outcome.disposition,
                    strengths: notes.strengths,
                    improvements: notes.improvements,
                    suggestions: notes.suggestions,
                },
                assignment: assignment_write,
                counter: counter_write,
            })
            .await?;

        // Counters just changed; re-read for an accurate readiness snapshot
        let submission = self
            .store
            .find_submission(submission_id)
            .await?
            .ok_or_else(|| AppError::SubmissionNotFound {
                id: submission_id.to_string(),
            })?;
        let readiness = readiness::evaluate(&submission);

        metrics::record_review(&review.kind, &review.disposition);

        notify::dispatch(
            self.notifier.clone(),
            Notification {
                kind: NotificationKind::XpAwarded,
                recipient_id: reviewer_id,
                payload: serde_json::json!({
                    "submission_id": submission_id,
                    "review_id": review.id,
                    "review_kind": review.kind,
                }),
            },
        );
        notify::dispatch(
            self.notifier.clone(),
            Notification {
                kind: NotificationKind::ReviewReceived,
                recipient_id: submission.author_id,
                payload: serde_json::json!({
                    "submission_id": submission_id,
                    "review_id": review.id,
                    "disposition": review.disposition,
                    "overall_score": review.overall_rounded(),
                }),
            },
        );

        info!(
            submission_id = %submission_id,
            reviewer_id = %reviewer_id,
            kind = %review.kind,
            disposition = %review.disposition,
            ready_for_merge = readiness.ready_for_merge,
            "Review accepted"
        );

        Ok(IntakeOutcome { review, readiness })
    }
}
