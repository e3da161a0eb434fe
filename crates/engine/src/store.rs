//! Storage seam for the review engine
//!
//! The engine talks to persistence through `ReviewStore` so the
//! orchestration logic can be exercised against an in-memory store in
//! tests. The production implementation is `peerflow_common::Repository`.

use async_trait::async_trait;
use peerflow_common::db::models::{Assignment, AssignmentStatus, Review, Reviewer, Submission};
use peerflow_common::db::{NewAssignment, Repository, ReviewWrite, ReviewerCandidate};
use peerflow_common::errors::Result;
use uuid::Uuid;

/// Persistence operations the engine needs
#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn find_submission(&self, id: Uuid) -> Result<Option<Submission>>;

    async fn find_reviewer(&self, id: Uuid) -> Result<Option<Reviewer>>;

    /// Fresh candidate pool with per-reviewer counters; never cached
    async fn candidate_pool(&self) -> Result<Vec<ReviewerCandidate>>;

    /// All assignments for a submission, any status
    async fn assignments_for_submission(&self, submission_id: Uuid) -> Result<Vec<Assignment>>;

    async fn find_assignment(
        &self,
        submission_id: Uuid,
        reviewer_id: Uuid,
    ) -> Result<Option<Assignment>>;

    async fn find_assignment_by_id(&self, id: Uuid) -> Result<Option<Assignment>>;

    /// Insert a pending assignment; `None` when the (submission, reviewer)
    /// pair already holds one
    async fn create_assignment(&self, new: NewAssignment) -> Result<Option<Assignment>>;

    /// Persist an already-validated lifecycle transition
    async fn transition_assignment(
        &self,
        id: Uuid,
        to: AssignmentStatus,
        reason: Option<String>,
    ) -> Result<Assignment>;

    async fn find_review(
        &self,
        submission_id: Uuid,
        reviewer_id: Uuid,
    ) -> Result<Option<Review>>;

    /// Atomically insert a review with its assignment and counter
    /// mutations; a pair conflict surfaces as `DuplicateReview`
    async fn submit_review(&self, write: ReviewWrite) -> Result<Review>;
}

#[async_trait]
impl ReviewStore for Repository {
    async fn find_submission(&self, id: Uuid) -> Result<Option<Submission>> {
        self.find_submission_by_id(id).await
    }

    async fn find_reviewer(&self, id: Uuid) -> Result<Option<Reviewer>> {
        self.find_reviewer_by_id(id).await
    }

    async fn candidate_pool(&self) -> Result<Vec<ReviewerCandidate>> {
        Repository::candidate_pool(self).await
    }

    async fn assignments_for_submission(&self, submission_id: Uuid) -> Result<Vec<Assignment>> {
        Repository::assignments_for_submission(self, submission_id).await
    }

    async fn find_assignment(
        &self,
        submission_id: Uuid,
        reviewer_id: Uuid,
    ) -> Result<Option<Assignment>> {
        Repository::find_assignment(self, submission_id, reviewer_id).await
    }

    async fn find_assignment_by_id(&self, id: Uuid) -> Result<Option<Assignment>> {
        Repository::find_assignment_by_id(self, id).await
    }

    async fn create_assignment(&self, new: NewAssignment) -> Result<Option<Assignment>> {
        Repository::create_assignment(self, new).await
    }

    async fn transition_assignment(
        &self,
        id: Uuid,
        to: AssignmentStatus,
        reason: Option<String>,
    ) -> Result<Assignment> {
        self.apply_assignment_transition(id, to, reason).await
    }

    async fn find_review(
        &self,
        submission_id: Uuid,
        reviewer_id: Uuid,
    ) -> Result<Option<Review>> {
        Repository::find_review(self, submission_id, reviewer_id).await
    }

    async fn submit_review(&self, write: ReviewWrite) -> Result<Review> {
        Repository::submit_review(self, write).await
    }
}

/// In-memory store for engine tests
#[cfg(test)]
pub(crate) mod memory {
    use super::*;
    use chrono::Utc;
    use peerflow_common::db::models::{MentorReviewStatus, ReviewerRole};
    use peerflow_common::db::{AssignmentWrite, CounterWrite};
    use peerflow_common::errors::AppError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct State {
        submissions: Vec<Submission>,
        reviewers: Vec<Reviewer>,
        candidates: Vec<ReviewerCandidate>,
        assignments: Vec<Assignment>,
        reviews: Vec<Review>,
    }

    #[derive(Default)]
    pub struct MemStore {
        state: Mutex<State>,
    }

    impl MemStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn add_submission(&self, submission: Submission) {
            self.state.lock().unwrap().submissions.push(submission);
        }

        pub fn add_reviewer(&self, id: Uuid, role: ReviewerRole) {
            let mut state = self.state.lock().unwrap();
            state.reviewers.push(Reviewer {
                id,
                handle: format!("reviewer-{id}"),
                role: String::from(role),
                is_active: true,
                created_at: Utc::now().into(),
            });
            state.candidates.push(ReviewerCandidate {
                id,
                role,
                merged_submissions: 1,
                completed_reviews: 1,
                pending_assignments: 0,
            });
        }

        pub fn assignment_count(&self, submission_id: Uuid) -> usize {
            self.state
                .lock()
                .unwrap()
                .assignments
                .iter()
                .filter(|a| a.submission_id == submission_id)
                .count()
        }

        pub fn review_count(&self) -> usize {
            self.state.lock().unwrap().reviews.len()
        }

        pub fn submission(&self, id: Uuid) -> Submission {
            self.state
                .lock()
                .unwrap()
                .submissions
                .iter()
                .find(|s| s.id == id)
                .cloned()
                .unwrap()
        }

        pub fn assignment(&self, submission_id: Uuid, reviewer_id: Uuid) -> Option<Assignment> {
            self.state
                .lock()
                .unwrap()
                .assignments
                .iter()
                .find(|a| a.submission_id == submission_id && a.reviewer_id == reviewer_id)
                .cloned()
        }
    }

    pub fn make_submission(author_id: Uuid, needed: i32) -> Submission {
        Submission {
            id: Uuid::new_v4(),
            author_id,
            project_id: Uuid::new_v4(),
            peer_reviews_needed: needed,
            peer_reviews_received: 0,
            mentor_review_status: String::from(MentorReviewStatus::None),
            status: "open".to_string(),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[async_trait]
    impl ReviewStore for MemStore {
        async fn find_submission(&self, id: Uuid) -> Result<Option<Submission>> {
            Ok(self
                .state
                .lock()
                .unwrap()
                .submissions
                .iter()
                .find(|s| s.id == id)
                .cloned())
        }

        async fn find_reviewer(&self, id: Uuid) -> Result<Option<Reviewer>> {
            Ok(self
                .state
                .lock()
                .unwrap()
                .reviewers
                .iter()
                .find(|r| r.id == id)
                .cloned())
        }

        async fn candidate_pool(&self) -> Result<Vec<ReviewerCandidate>> {
            Ok(self.state.lock().unwrap().candidates.clone())
        }

        async fn assignments_for_submission(
            &self,
            submission_id: Uuid,
        ) -> Result<Vec<Assignment>> {
            Ok(self
                .state
                .lock()
                .unwrap()
                .assignments
                .iter()
                .filter(|a| a.submission_id == submission_id)
                .cloned()
                .collect())
        }

        async fn find_assignment(
            &self,
            submission_id: Uuid,
            reviewer_id: Uuid,
        ) -> Result<Option<Assignment>> {
            Ok(self.assignment(submission_id, reviewer_id))
        }

        async fn find_assignment_by_id(&self, id: Uuid) -> Result<Option<Assignment>> {
            Ok(self
                .state
                .lock()
                .unwrap()
                .assignments
                .iter()
                .find(|a| a.id == id)
                .cloned())
        }

        async fn create_assignment(&self, new: NewAssignment) -> Result<Option<Assignment>> {
            let mut state = self.state.lock().unwrap();

            let exists = state.assignments.iter().any(|a| {
                a.submission_id == new.submission_id && a.reviewer_id == new.reviewer_id
            });
            if exists {
                return Ok(None);
            }

            let now = Utc::now();
            let assignment = Assignment {
                id: Uuid::new_v4(),
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
            };
            state.assignments.push(assignment.clone());
            Ok(Some(assignment))
        }

        async fn transition_assignment(
            &self,
            id: Uuid,
            to: AssignmentStatus,
            reason: Option<String>,
        ) -> Result<Assignment> {
            let mut state = self.state.lock().unwrap();
            let now = Utc::now();

            let assignment = state
                .assignments
                .iter_mut()
                .find(|a| a.id == id)
                .ok_or_else(|| AppError::AssignmentNotFound { id: id.to_string() })?;

            assignment.status = String::from(to);
            match to {
                AssignmentStatus::Accepted => assignment.accepted_at = Some(now.into()),
                AssignmentStatus::Completed => {
                    assignment.accepted_at.get_or_insert(now.into());
                    assignment.completed_at = Some(now.into());
                }
                AssignmentStatus::Declined => {
                    assignment.declined_at = Some(now.into());
                    assignment.declined_reason = reason;
                }
                AssignmentStatus::Expired => assignment.expired_at = Some(now.into()),
                AssignmentStatus::Cancelled => assignment.cancelled_at = Some(now.into()),
                AssignmentStatus::Pending => {}
            }

            Ok(assignment.clone())
        }

        async fn find_review(
            &self,
            submission_id: Uuid,
            reviewer_id: Uuid,
        ) -> Result<Option<Review>> {
            Ok(self
                .state
                .lock()
                .unwrap()
                .reviews
                .iter()
                .find(|r| r.submission_id == submission_id && r.reviewer_id == reviewer_id)
                .cloned())
        }

        async fn submit_review(&self, write: ReviewWrite) -> Result<Review> {
            let mut state = self.state.lock().unwrap();
            let now = Utc::now();
            let new = write.review;

            if let Some(existing) = state
                .reviews
                .iter()
                .find(|r| r.submission_id == new.submission_id && r.reviewer_id == new.reviewer_id)
            {
                return Err(AppError::DuplicateReview {
                    existing_review_id: existing.id,
                });
            }

            let review = Review {
                id: Uuid::new_v4(),
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
            };
            state.reviews.push(review.clone());

            match write.assignment {
                AssignmentWrite::Complete { assignment_id } => {
                    if let Some(a) = state.assignments.iter_mut().find(|a| a.id == assignment_id) {
                        a.status = String::from(AssignmentStatus::Completed);
                        a.accepted_at.get_or_insert(now.into());
                        a.completed_at = Some(now.into());
                    }
                }
                AssignmentWrite::SynthesizeMentor { priority, due_at } => {
                    state.assignments.push(Assignment {
                        id: Uuid::new_v4(),
                        submission_id: new.submission_id,
                        reviewer_id: new.reviewer_id,
                        kind: "mentor".to_string(),
                        priority,
                        due_at: due_at.into(),
                        status: String::from(AssignmentStatus::Completed),
                        declined_reason: None,
                        created_at: now.into(),
                        accepted_at: Some(now.into()),
                        completed_at: Some(now.into()),
                        declined_at: None,
                        expired_at: None,
                        cancelled_at: None,
                    });
                }
                AssignmentWrite::None => {}
            }

            match write.counter {
                CounterWrite::IncrementPeerReviews => {
                    if let Some(s) = state
                        .submissions
                        .iter_mut()
                        .find(|s| s.id == new.submission_id)
                    {
                        s.peer_reviews_received += 1;
                    }
                }
                CounterWrite::SetMentorStatus(status) => {
                    if let Some(s) = state
                        .submissions
                        .iter_mut()
                        .find(|s| s.id == new.submission_id)
                    {
                        s.mentor_review_status = String::from(status);
                    }
                }
                CounterWrite::None => {}
            }

            Ok(review)
        }
    }
}
