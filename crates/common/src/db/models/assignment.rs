//! Assignment entity - one reviewer's obligation to review one submission
//!
//! Exactly one assignment may exist per (submission, reviewer) pair; the
//! unique constraint backing this lives in the schema. Terminal rows are
//! retained for audit, never deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Assignment kind
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentKind {
    Peer,
    Mentor,
    Admin,
}

impl From<String> for AssignmentKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "mentor" => AssignmentKind::Mentor,
            "admin" => AssignmentKind::Admin,
            _ => AssignmentKind::Peer,
        }
    }
}

impl From<AssignmentKind> for String {
    fn from(kind: AssignmentKind) -> Self {
        match kind {
            AssignmentKind::Peer => "peer".to_string(),
            AssignmentKind::Mentor => "mentor".to_string(),
            AssignmentKind::Admin => "admin".to_string(),
        }
    }
}

/// Assignment lifecycle status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Pending,
    Accepted,
    Completed,
    Declined,
    Expired,
    Cancelled,
}

impl AssignmentStatus {
    /// Check if this status is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AssignmentStatus::Completed
                | AssignmentStatus::Declined
                | AssignmentStatus::Expired
                | AssignmentStatus::Cancelled
        )
    }

    /// Stable string form used in the database and in error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Pending => "pending",
            AssignmentStatus::Accepted => "accepted",
            AssignmentStatus::Completed => "completed",
            AssignmentStatus::Declined => "declined",
            AssignmentStatus::Expired => "expired",
            AssignmentStatus::Cancelled => "cancelled",
        }
    }
}

impl From<String> for AssignmentStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "accepted" => AssignmentStatus::Accepted,
            "completed" => AssignmentStatus::Completed,
            "declined" => AssignmentStatus::Declined,
            "expired" => AssignmentStatus::Expired,
            "cancelled" => AssignmentStatus::Cancelled,
            _ => AssignmentStatus::Pending,
        }
    }
}

impl From<AssignmentStatus> for String {
    fn from(status: AssignmentStatus) -> Self {
        status.as_str().to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "assignments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub submission_id: Uuid,

    pub reviewer_id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub kind: String,

    pub priority: i32,

    pub due_at: DateTimeWithTimeZone,

    #[sea_orm(column_type = "Text")]
    pub status: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub declined_reason: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    pub accepted_at: Option<DateTimeWithTimeZone>,

    pub completed_at: Option<DateTimeWithTimeZone>,

    pub declined_at: Option<DateTimeWithTimeZone>,

    pub expired_at: Option<DateTimeWithTimeZone>,

    pub cancelled_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Get the assignment status as an enum
    pub fn assignment_status(&self) -> AssignmentStatus {
        AssignmentStatus::from(self.status.clone())
    }

    /// Get the assignment kind as an enum
    pub fn assignment_kind(&self) -> AssignmentKind {
        AssignmentKind::from(self.kind.clone())
    }

    /// Check if the assignment is in a terminal state
    pub fn is_terminal(&self) -> bool {
        self.assignment_status().is_terminal()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::submission::Entity",
        from = "Column::SubmissionId",
        to = "super::submission::Column::Id"
    )]
    Submission,

    #[sea_orm(
        belongs_to = "super::reviewer::Entity",
        from = "Column::ReviewerId",
        to = "super::reviewer::Column::Id"
    )]
    Reviewer,
}

impl Related<super::submission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submission.def()
    }
}

impl Related<super::reviewer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviewer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
