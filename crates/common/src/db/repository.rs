//! Repository pattern for database operations
//!
//! Provides a clean interface for all data access operations with proper
//! error handling and transaction support. The pair-uniqueness invariants
//! (one assignment, one review per (submission, reviewer)) are enforced by
//! unique constraints in the schema; the conflict-tolerant inserts here
//! recover from races instead of re-checking in application code.

use crate::db::models::*;
use crate::db::DbPool;
use crate::errors::{AppError, Result};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbBackend, EntityTrait, QueryFilter, Set,
    Statement, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A prospective reviewer at ranking time. Derived, never persisted: the
/// counters are recomputed fresh per ranking call since load changes
/// between requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewerCandidate {
    pub id: Uuid,
    pub role: ReviewerRole,
    pub merged_submissions: i64,
    pub completed_reviews: i64,
    pub pending_assignments: i64,
}

/// Fields for a new assignment row
#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub submission_id: Uuid,
    pub reviewer_id: Uuid,
    pub kind: AssignmentKind,
    pub priority: i32,
    pub due_at: DateTime<Utc>,
}

/// Fields for a new review row
#[derive(Debug, Clone)]
pub struct NewReview {
    pub submission_id: Uuid,
    pub reviewer_id: Uuid,
    pub kind: AssignmentKind,
    pub functionality: Option<i32>,
    pub code_quality: Option<i32>,
    pub best_practices: Option<i32>,
    pub documentation: Option<i32>,
    pub overall_score: Option<f64>,
    pub disposition: Disposition,
    pub strengths: Option<String>,
    pub improvements: Option<String>,
    pub suggestions: Option<String>,
}

/// Assignment mutation to perform alongside a review insert
#[derive(Debug, Clone)]
pub enum AssignmentWrite {
    /// Transition an existing assignment to completed. A still-pending
    /// assignment is implicitly accepted in the same step.
    Complete { assignment_id: Uuid },

    /// Mentor path: no assignment existed for this pair; synthesize one
    /// directly in accepted state at submission time.
    SynthesizeMentor {
        priority: i32,
        due_at: DateTime<Utc>,
    },

    /// Nothing to write (assignment already completed)
    None,
}

/// Submission counter mutation to perform alongside a review insert
#[derive(Debug, Clone)]
pub enum CounterWrite {
    IncrementPeerReviews,
    SetMentorStatus(MentorReviewStatus),
    None,
}

/// The full transactional write for one review submission
#[derive(Debug, Clone)]
pub struct ReviewWrite {
    pub review: NewReview,
    pub assignment: AssignmentWrite,
    pub counter: CounterWrite,
}

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // Submission Operations
    // ========================================================================

    /// Find submission by ID
    pub async fn find_submission_by_id(&self, id: Uuid) -> Result<Option<Submission>> {
        SubmissionEntity::find_by_id(id)
            .one(self.pool.read())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Reviewer Operations
    // ========================================================================

    /// Find reviewer by ID
    pub async fn find_reviewer_by_id(&self, id: Uuid) -> Result<Option<Reviewer>> {
        ReviewerEntity::find_by_id(id)
            .one(self.pool.read())
            .await
            .map_err(Into::into)
    }

    /// Compute the candidate pool with fresh per-reviewer counters.
    ///
    /// One aggregate query: merged submissions authored (experience),
    /// completed reviews (activity), and open assignments (load). Inactive
    /// reviewers are excluded here; author/admin filtering belongs to the
    /// ranker.
    pub async fn candidate_pool(&self) -> Result<Vec<ReviewerCandidate>> {
        let sql = r#"
            SELECT
                r.id,
                r.role,
                COALESCE(m.merged, 0) AS merged_submissions,
                COALESCE(cr.completed, 0) AS completed_reviews,
                COALESCE(pa.pending, 0) AS pending_assignments
            FROM reviewers r
            LEFT JOIN (
                SELECT author_id, COUNT(*) AS merged
                FROM submissions WHERE status = 'merged'
                GROUP BY author_id
            ) m ON m.author_id = r.id
            LEFT JOIN (
                SELECT reviewer_id, COUNT(*) AS completed
                FROM reviews
                GROUP BY reviewer_id
            ) cr ON cr.reviewer_id = r.id
            LEFT JOIN (
                SELECT reviewer_id, COUNT(*) AS pending
                FROM assignments WHERE status IN ('pending', 'accepted')
                GROUP BY reviewer_id
            ) pa ON pa.reviewer_id = r.id
            WHERE r.is_active
        "#;

        let stmt = Statement::from_string(DbBackend::Postgres, sql);

        let candidates = self
            .pool
            .read()
            .query_all(stmt)
            .await?
            .into_iter()
            .filter_map(|row| {
                Some(ReviewerCandidate {
                    id: row.try_get_by_index::<Uuid>(0).ok()?,
                    role: ReviewerRole::from(row.try_get_by_index::<String>(1).ok()?),
                    merged_submissions: row.try_get_by_index::<i64>(2).ok()?,
                    completed_reviews: row.try_get_by_index::<i64>(3).ok()?,
                    pending_assignments: row.try_get_by_index::<i64>(4).ok()?,
                })
            })
            .collect();

        Ok(candidates)
    }

    // ========================================================================
    // Assignment Operations
    // ========================================================================

    /// Find assignment by ID
    pub async fn find_assignment_by_id(&self, id: Uuid) -> Result<Option<Assignment>> {
        AssignmentEntity::find_by_id(id)
            .one(self.pool.read())
            .await
            .map_err(Into::into)
    }

    /// All assignments for a submission, any status
    pub async fn assignments_for_submission(&self, submission_id: Uuid) -> Result<Vec<Assignment>> {
        AssignmentEntity::find()
            .filter(AssignmentColumn::SubmissionId.eq(submission_id))
            .all(self.pool.read())
            .await
            .map_err(Into::into)
    }

    /// Find the assignment for a (submission, reviewer) pair
    pub async fn find_assignment(
        &self,
        submission_id: Uuid,
        reviewer_id: Uuid,
    ) -> Result<Option<Assignment>> {
        AssignmentEntity::find()
            .filter(AssignmentColumn::SubmissionId.eq(submission_id))
            .filter(AssignmentColumn::ReviewerId.eq(reviewer_id))
            .one(self.pool.read())
            .await
            .map_err(Into::into)
    }

    /// Insert a pending assignment, guarded by the (submission, reviewer)
    /// unique constraint. Returns `None` when the pair already holds an
    /// assignment - a concurrent batch got there first, which the caller
    /// treats as "already assigned" and skips.
    pub async fn create_assignment(&self, new: NewAssignment) -> Result<Option<Assignment>> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            INSERT INTO assignments
                (id, submission_id, reviewer_id, kind, priority, due_at, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, 'pending', $7)
            ON CONFLICT (submission_id, reviewer_id) DO NOTHING
            RETURNING id
            "#,
            vec![
                id.into(),
                new.submission_id.into(),
                new.reviewer_id.into(),
                String::from(new.kind).into(),
                new.priority.into(),
                new.due_at.into(),
                now.into(),
            ],
        );

        let inserted = self.pool.write().query_one(stmt).await?;

        if inserted.is_none() {
            return Ok(None);
        }

        Ok(Some(Assignment {
            id,
            submission_id: new.submission_id,
            reviewer_id: new.reviewer_id,
            kind: String::from(new.kind),
            priority: new.priority,
            due_at: new.due_at.into(),
            status: String::from(AssignmentStatus::Pending),
            declined_reason: None,
            created_at: now.into(),
            accepted_at: None,
            completed_at: None,
            declined_at: None,
            expired_at: None,
            cancelled_at: None,
        }))
    }

    /// Persist an already-validated lifecycle transition, stamping the
    /// timestamp that matches the target state. Transition legality is the
    /// caller's concern (the lifecycle state machine).
    pub async fn apply_assignment_transition(
        &self,
        assignment_id: Uuid,
        to: AssignmentStatus,
        declined_reason: Option<String>,
    ) -> Result<Assignment> {
        let now = Utc::now();

        let mut assignment: AssignmentActiveModel = AssignmentEntity::find_by_id(assignment_id)
            .one(self.pool.write())
            .await?
            .ok_or_else(|| AppError::AssignmentNotFound {
                id: assignment_id.to_string(),
            })?
            .into();

        assignment.status = Set(String::from(to));

        match to {
            AssignmentStatus::Accepted => assignment.accepted_at = Set(Some(now.into())),
            AssignmentStatus::Completed => {
                // Straight-to-submit reviewers never explicitly accepted
                if assignment.accepted_at.as_ref().is_none() {
                    assignment.accepted_at = Set(Some(now.into()));
                }
                assignment.completed_at = Set(Some(now.into()));
            }
            AssignmentStatus::Declined => {
                assignment.declined_at = Set(Some(now.into()));
                assignment.declined_reason = Set(declined_reason);
            }
            AssignmentStatus::Expired => assignment.expired_at = Set(Some(now.into())),
            AssignmentStatus::Cancelled => assignment.cancelled_at = Set(Some(now.into())),
            AssignmentStatus::Pending => {}
        }

        assignment.update(self.pool.write()).await.map_err(Into::into)
    }

    /// Expire every open assignment past its due date. Invoked by the
    /// external reminder/cron collaborator, not by an in-process task.
    pub async fn expire_overdue(&self, now: DateTime<Utc>) -> Result<u64> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            UPDATE assignments
            SET status = 'expired', expired_at = $1
            WHERE status IN ('pending', 'accepted') AND due_at < $1
            "#,
            vec![now.into()],
        );

        let result = self.pool.write().execute(stmt).await?;
        Ok(result.rows_affected())
    }

    // ========================================================================
    // Review Operations
    // ========================================================================

    /// Find the review for a (submission, reviewer) pair
    pub async fn find_review(
        &self,
        submission_id: Uuid,
        reviewer_id: Uuid,
    ) -> Result<Option<Review>> {
        ReviewEntity::find()
            .filter(ReviewColumn::SubmissionId.eq(submission_id))
            .filter(ReviewColumn::ReviewerId.eq(reviewer_id))
            .one(self.pool.read())
            .await
            .map_err(Into::into)
    }

    /// Persist one review submission atomically: insert the review row,
    /// apply the assignment mutation, and bump the submission counters in a
    /// single transaction. A unique-constraint conflict on the review insert
    /// rolls everything back and surfaces as `DuplicateReview` carrying the
    /// existing review id.
    pub async fn submit_review(&self, write: ReviewWrite) -> Result<Review> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let new = write.review;

        let txn = self.pool.write().begin().await?;

        let insert = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            INSERT INTO reviews
                (id, submission_id, reviewer_id, kind,
                 functionality, code_quality, best_practices, documentation,
                 overall_score, disposition, strengths, improvements, suggestions,
                 created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (submission_id, reviewer_id) DO NOTHING
            RETURNING id
            "#,
            vec![
                id.into(),
                new.submission_id.into(),
                new.reviewer_id.into(),
                String::from(new.kind).into(),
                new.functionality.into(),
                new.code_quality.into(),
                new.best_practices.into(),
                new.documentation.into(),
                new.overall_score.into(),
                String::from(new.disposition).into(),
                new.strengths.clone().into(),
                new.improvements.clone().into(),
                new.suggestions.clone().into(),
                now.into(),
            ],
        );

        if txn.query_one(insert).await?.is_none() {
            // Lost the race; report the surviving review
            txn.rollback().await?;
            let existing = self
                .find_review(new.submission_id, new.reviewer_id)
                .await?
                .ok_or_else(|| AppError::Internal {
                    message: "review insert conflicted but no existing row found".to_string(),
                })?;
            return Err(AppError::DuplicateReview {
                existing_review_id: existing.id,
            });
        }

        match write.assignment {
            AssignmentWrite::Complete { assignment_id } => {
                let stmt = Statement::from_sql_and_values(
                    DbBackend::Postgres,
                    r#"
                    UPDATE assignments
                    SET status = 'completed',
                        accepted_at = COALESCE(accepted_at, $2),
                        completed_at = $2
                    WHERE id = $1
                    "#,
                    vec![assignment_id.into(), now.into()],
                );
                txn.execute(stmt).await?;
            }
            AssignmentWrite::SynthesizeMentor { priority, due_at } => {
                let stmt = Statement::from_sql_and_values(
                    DbBackend::Postgres,
                    r#"
                    INSERT INTO assignments
                        (id, submission_id, reviewer_id, kind, priority, due_at,
                         status, created_at, accepted_at, completed_at)
                    VALUES ($1, $2, $3, 'mentor', $4, $5, 'completed', $6, $6, $6)
                    ON CONFLICT (submission_id, reviewer_id) DO NOTHING
                    "#,
                    vec![
                        Uuid::new_v4().into(),
                        new.submission_id.into(),
                        new.reviewer_id.into(),
                        priority.into(),
                        due_at.into(),
                        now.into(),
                    ],
                );
                txn.execute(stmt).await?;
            }
            AssignmentWrite::None => {}
        }

        match write.counter {
            CounterWrite::IncrementPeerReviews => {
                let stmt = Statement::from_sql_and_values(
                    DbBackend::Postgres,
                    r#"
                    UPDATE submissions
                    SET peer_reviews_received = peer_reviews_received + 1, updated_at = $2
                    WHERE id = $1
                    "#,
                    vec![new.submission_id.into(), now.into()],
                );
                txn.execute(stmt).await?;
            }
            CounterWrite::SetMentorStatus(status) => {
                let stmt = Statement::from_sql_and_values(
                    DbBackend::Postgres,
                    r#"
                    UPDATE submissions
                    SET mentor_review_status = $2, updated_at = $3
                    WHERE id = $1
                    "#,
                    vec![
                        new.submission_id.into(),
                        String::from(status).into(),
                        now.into(),
                    ],
                );
                txn.execute(stmt).await?;
            }
            CounterWrite::None => {}
        }

        txn.commit().await?;

        Ok(Review {
            id,
            submission_id: new.submission_id,
            reviewer_id: new.reviewer_id,
            kind: String::from(new.kind),
            functionality: new.functionality,
            code_quality: new.code_quality,
            best_practices: new.best_practices,
            documentation: new.documentation,
            overall_score: new.overall_score,
            disposition: String::from(new.disposition),
            strengths: new.strengths,
            improvements: new.improvements,
            suggestions: new.suggestions,
            created_at: now.into(),
        })
    }
}
