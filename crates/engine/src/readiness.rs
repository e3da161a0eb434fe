//! Merge-readiness derivation
//!
//! Pure function over the current submission state; recomputed after every
//! review submission and exposed as a read-only status endpoint.

use peerflow_common::db::models::{MentorReviewStatus, Submission};
use serde::{Deserialize, Serialize};

/// Derived review status of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Readiness {
    pub peer_reviews_complete: bool,
    pub mentor_approved: bool,
    pub ready_for_merge: bool,
    pub peer_reviews_received: i32,
    pub peer_reviews_needed: i32,
}

/// Derive readiness from a submission
pub fn evaluate(submission: &Submission) -> Readiness {
    let peer_reviews_complete =
        submission.peer_reviews_received >= submission.peer_reviews_needed;
    let mentor_approved = submission.mentor_status() == MentorReviewStatus::Approved;

    Readiness {
        peer_reviews_complete,
        mentor_approved,
        ready_for_merge: peer_reviews_complete && mentor_approved,
        peer_reviews_received: submission.peer_reviews_received,
        peer_reviews_needed: submission.peer_reviews_needed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn submission(received: i32, needed: i32, mentor: MentorReviewStatus) -> Submission {
        Submission {
            id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            peer_reviews_needed: needed,
            peer_reviews_received: received,
            mentor_review_status: String::from(mentor),
            status: "open".to_string(),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_one_of_two_reviews_blocks_merge_despite_mentor_approval() {
        let readiness = evaluate(&submission(1, 2, MentorReviewStatus::Approved));
        assert!(!readiness.peer_reviews_complete);
        assert!(readiness.mentor_approved);
        assert!(!readiness.ready_for_merge);
    }

    #[test]
    fn test_peer_reviews_alone_do_not_unlock_merge() {
        let readiness = evaluate(&submission(2, 2, MentorReviewStatus::None));
        assert!(readiness.peer_reviews_complete);
        assert!(!readiness.mentor_approved);
        assert!(!readiness.ready_for_merge);

        let readiness = evaluate(&submission(2, 2, MentorReviewStatus::ChangesRequested));
        assert!(!readiness.ready_for_merge);
    }

    #[test]
    fn test_ready_when_both_satisfied() {
        let readiness = evaluate(&submission(2, 2, MentorReviewStatus::Approved));
        assert!(readiness.ready_for_merge);
    }

    #[test]
    fn test_surplus_reviews_count() {
        let readiness = evaluate(&submission(3, 2, MentorReviewStatus::Approved));
        assert!(readiness.peer_reviews_complete);
        assert!(readiness.ready_for_merge);
    }
}
