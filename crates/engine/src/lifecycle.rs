//! Assignment lifecycle state machine
//!
//! Permitted transitions:
//!
//! ```text
//! pending  -> accepted | declined | expired
//! accepted -> completed | expired
//! any non-terminal -> cancelled
//! ```
//!
//! Re-requesting a transition whose target equals the current state is a
//! no-op success, so repeated completion cannot double-fire side effects
//! (XP awards, counters). Every other mismatch is an `InvalidTransition`
//! error naming both states - those indicate a caller bug.

use crate::store::ReviewStore;
use peerflow_common::db::models::{Assignment, AssignmentStatus};
use peerflow_common::errors::{AppError, Result};
use uuid::Uuid;

/// Outcome of validating one transition request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The transition is legal and should be persisted
    Apply,

    /// The assignment is already in the requested state
    NoOp,
}

/// What review intake should do with the matching assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionAction {
    /// Transition to completed (implicitly accepting a pending one)
    Complete,

    /// Already completed; write nothing
    AlreadyCompleted,
}

/// Validate a single transition request
pub fn step(current: AssignmentStatus, requested: AssignmentStatus) -> Result<Transition> {
    use AssignmentStatus::*;

    if current == requested {
        return Ok(Transition::NoOp);
    }

    let permitted = matches!(
        (current, requested),
        (Pending, Accepted)
            | (Pending, Declined)
            | (Pending, Expired)
            | (Accepted, Completed)
            | (Accepted, Expired)
    ) || (requested == Cancelled && !current.is_terminal());

    if permitted {
        Ok(Transition::Apply)
    } else {
        Err(AppError::InvalidTransition {
            from: current.as_str().to_string(),
            to: requested.as_str().to_string(),
        })
    }
}

/// Resolve how review intake completes an assignment. A reviewer who never
/// explicitly accepted but goes straight to submitting is still valid: the
/// pending assignment is accepted and completed in one step.
pub fn complete_for_review(current: AssignmentStatus) -> Result<CompletionAction> {
    use AssignmentStatus::*;

    match current {
        Pending => {
            step(Pending, Accepted)?;
            step(Accepted, Completed)?;
            Ok(CompletionAction::Complete)
        }
        Accepted => {
            step(Accepted, Completed)?;
            Ok(CompletionAction::Complete)
        }
        Completed => Ok(CompletionAction::AlreadyCompleted),
        Declined | Expired | Cancelled => Err(AppError::InvalidTransition {
            from: current.as_str().to_string(),
            to: Completed.as_str().to_string(),
        }),
    }
}

/// Apply a reviewer/administrator transition request (accept, decline,
/// cancel) to a stored assignment. Declines must carry a reason.
pub async fn respond<S: ReviewStore>(
    store: &S,
    assignment_id: Uuid,
    requested: AssignmentStatus,
    reason: Option<String>,
) -> Result<Assignment> {
    if requested == AssignmentStatus::Declined && reason.as_deref().unwrap_or("").is_empty() {
        return Err(AppError::MissingField {
            field: "reason".to_string(),
        });
    }

    let assignment = store
        .find_assignment_by_id(assignment_id)
        .await?
        .ok_or_else(|| AppError::AssignmentNotFound {
            id: assignment_id.to_string(),
        })?;

    match step(assignment.assignment_status(), requested)? {
        Transition::NoOp => Ok(assignment),
        Transition::Apply => {
            store
                .transition_assignment(assignment_id, requested, reason)
                .await
        }
    }
}
