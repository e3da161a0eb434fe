//! Reviewer assignment batches
//!
//! Orchestrates one assignment request end to end: load the submission,
//! rank the candidate pool, create pending assignments, and notify the
//! picked reviewers. Batches are conflict-tolerant: a pair that gained an
//! assignment concurrently is skipped, never a batch failure.

use crate::ranking;
use crate::store::ReviewStore;
use chrono::{Duration, Utc};
use peerflow_common::config::ReviewConfig;
use peerflow_common::db::models::{Assignment, AssignmentKind};
use peerflow_common::db::NewAssignment;
use peerflow_common::errors::{AppError, Result};
use peerflow_common::metrics;
use peerflow_common::notify::{self, Notification, NotificationKind, Notifier};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use uuid::Uuid;

/// Outcome of one assignment request
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentBatch {
    /// How many reviewers were asked for
    pub requested: usize,

    /// Assignments actually created. May be shorter than `requested`
    /// when the pool is small or concurrent batches raced; zero when
    /// every eligible reviewer already holds an assignment.
    pub assignments: Vec<Assignment>,
}

impl AssignmentBatch {
    pub fn created(&self) -> usize {
        self.assignments.len()
    }
}

/// Creates peer review assignments for submissions
pub struct AssignmentEngine<S> {
    store: S,
    notifier: Arc<dyn Notifier>,
    config: ReviewConfig,
}

impl<S: ReviewStore> AssignmentEngine<S> {
    pub fn new(store: S, notifier: Arc<dyn Notifier>, config: ReviewConfig) -> Self {
        Self {
            store,
            notifier,
            config,
        }
    }

    /// Assign up to `count` peer reviewers to a submission.
    ///
    /// Fails with `NoEligibleReviewers` only when nobody in the pool could
    /// ever review this submission (everyone is the author, an admin, or
    /// inactive). When eligible reviewers exist but all already hold
    /// assignments the batch succeeds with zero created, so re-requesting
    /// assignments is idempotent.
    pub async fn assign_reviewers(
        &self,
        submission_id: Uuid,
        count: Option<usize>,
    ) -> Result<AssignmentBatch> {
        let submission = self
            .store
            .find_submission(submission_id)
            .await?
            .ok_or_else(|| AppError::SubmissionNotFound {
                id: submission_id.to_string(),
            })?;

        let requested = count.unwrap_or(self.config.peer_reviewers);

        let ranking_start = Instant::now();

        let pool = self.store.candidate_pool().await?;
        let eligible = ranking::eligible_pool(&pool, submission.author_id);
        if eligible.is_empty() {
            return Err(AppError::NoEligibleReviewers { submission_id });
        }

        let exclude: HashSet<Uuid> = self
            .store
            .assignments_for_submission(submission_id)
            .await?
            .into_iter()
            .map(|a| a.reviewer_id)
            .collect();

        let selected =
            ranking::select_reviewers(&eligible, &exclude, requested, &mut rand::thread_rng());

        let ranking_secs = ranking_start.elapsed().as_secs_f64();

        let due_at = Utc::now() + Duration::days(self.config.due_days);
        let mut assignments = Vec::with_capacity(selected.len());
        let mut skipped = 0usize;

        for reviewer_id in selected {
            let created = self
                .store
                .create_assignment(NewAssignment {
                    submission_id,
                    reviewer_id,
                    kind: AssignmentKind::Peer,
                    priority: self.config.default_priority,
                    due_at,
                })
                .await?;

            match created {
                Some(assignment) => {
                    notify::dispatch(
                        self.notifier.clone(),
                        Notification {
                            kind: NotificationKind::ReviewAssigned,
                            recipient_id: reviewer_id,
                            payload: serde_json::json!({
                                "submission_id": submission_id,
                                "assignment_id": assignment.id,
                                "due_at": assignment.due_at,
                            }),
                        },
                    );
                    assignments.push(assignment);
                }
                // Pair gained an assignment since we ranked
                None => skipped += 1,
            }
        }

        metrics::record_assignment_batch(assignments.len(), skipped, ranking_secs);

        info!(
            submission_id = %submission_id,
            requested,
            created = assignments.len(),
            skipped,
            "Assignment batch complete"
        );

        Ok(AssignmentBatch {
            requested,
            assignments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::{make_submission, MemStore};
    use peerflow_common::db::models::ReviewerRole;
    use peerflow_common::notify::NoopNotifier;

    fn engine(store: MemStore) -> AssignmentEngine<MemStore> {
        AssignmentEngine::new(store, Arc::new(NoopNotifier), ReviewConfig {
            peer_reviewers: 2,
            due_days: 7,
            default_priority: 0,
        })
    }

    #[tokio::test]
    async fn test_assigns_default_count() {
        let store = MemStore::new();
        let author = Uuid::new_v4();
        let submission = make_submission(author, 2);
        let submission_id = submission.id;
        store.add_submission(submission);
        for _ in 0..5 {
            store.add_reviewer(Uuid::new_v4(), ReviewerRole::Member);
        }

        let engine = engine(store);
        let batch = engine.assign_reviewers(submission_id, None).await.unwrap();

        assert_eq!(batch.requested, 2);
        assert_eq!(batch.created(), 2);
        assert_eq!(engine.store.assignment_count(submission_id), 2);
        for assignment in &batch.assignments {
            assert_eq!(assignment.submission_id, submission_id);
            assert_eq!(assignment.status, "pending");
            assert_ne!(assignment.reviewer_id, author);
        }
    }

    #[tokio::test]
    async fn test_unknown_submission() {
        let store = MemStore::new();
        store.add_reviewer(Uuid::new_v4(), ReviewerRole::Member);

        let engine = engine(store);
        let err = engine
            .assign_reviewers(Uuid::new_v4(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::SubmissionNotFound { .. }));
    }

    #[tokio::test]
    async fn test_no_eligible_reviewers() {
        // Pool holds only the author and an admin
        let store = MemStore::new();
        let author = Uuid::new_v4();
        let submission = make_submission(author, 2);
        let submission_id = submission.id;
        store.add_submission(submission);
        store.add_reviewer(author, ReviewerRole::Member);
        store.add_reviewer(Uuid::new_v4(), ReviewerRole::Admin);

        let engine = engine(store);
        let err = engine
            .assign_reviewers(submission_id, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NoEligibleReviewers { .. }));
    }

    #[tokio::test]
    async fn test_repeat_request_creates_nothing_and_succeeds() {
        let store = MemStore::new();
        let submission = make_submission(Uuid::new_v4(), 2);
        let submission_id = submission.id;
        store.add_submission(submission);
        store.add_reviewer(Uuid::new_v4(), ReviewerRole::Member);
        store.add_reviewer(Uuid::new_v4(), ReviewerRole::Member);

        let engine = engine(store);

        let first = engine.assign_reviewers(submission_id, None).await.unwrap();
        assert_eq!(first.created(), 2);

        // Everyone eligible is now assigned; not an error
        let second = engine.assign_reviewers(submission_id, None).await.unwrap();
        assert_eq!(second.created(), 0);
        assert_eq!(engine.store.assignment_count(submission_id), 2);
    }

    #[tokio::test]
    async fn test_small_pool_assigns_fewer_than_requested() {
        let store = MemStore::new();
        let submission = make_submission(Uuid::new_v4(), 2);
        let submission_id = submission.id;
        store.add_submission(submission);
        store.add_reviewer(Uuid::new_v4(), ReviewerRole::Member);

        let engine = engine(store);
        let batch = engine.assign_reviewers(submission_id, None).await.unwrap();

        assert_eq!(batch.requested, 2);
        assert_eq!(batch.created(), 1);
    }

    #[tokio::test]
    async fn test_explicit_count_overrides_default() {
        let store = MemStore::new();
        let submission = make_submission(Uuid::new_v4(), 2);
        let submission_id = submission.id;
        store.add_submission(submission);
        for _ in 0..6 {
            store.add_reviewer(Uuid::new_v4(), ReviewerRole::Member);
        }

        let engine = engine(store);
        let batch = engine
            .assign_reviewers(submission_id, Some(3))
            .await
            .unwrap();
        assert_eq!(batch.created(), 3);
    }
}
