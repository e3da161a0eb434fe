//! Submission entity - a unit of work awaiting review

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Submission lifecycle status
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Open,
    Closed,
    Merged,
}

impl From<String> for SubmissionStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "closed" => SubmissionStatus::Closed,
            "merged" => SubmissionStatus::Merged,
            _ => SubmissionStatus::Open,
        }
    }
}

impl From<SubmissionStatus> for String {
    fn from(status: SubmissionStatus) -> Self {
        match status {
            SubmissionStatus::Open => "open".to_string(),
            SubmissionStatus::Closed => "closed".to_string(),
            SubmissionStatus::Merged => "merged".to_string(),
        }
    }
}

/// Mentor review disposition on a submission
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MentorReviewStatus {
    None,
    Approved,
    ChangesRequested,
}

impl From<String> for MentorReviewStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "approved" => MentorReviewStatus::Approved,
            "changes_requested" => MentorReviewStatus::ChangesRequested,
            _ => MentorReviewStatus::None,
        }
    }
}

impl From<MentorReviewStatus> for String {
    fn from(status: MentorReviewStatus) -> Self {
        match status {
            MentorReviewStatus::None => "none".to_string(),
            MentorReviewStatus::Approved => "approved".to_string(),
            MentorReviewStatus::ChangesRequested => "changes_requested".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "submissions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub author_id: Uuid,

    pub project_id: Uuid,

    pub peer_reviews_needed: i32,

    pub peer_reviews_received: i32,

    #[sea_orm(column_type = "Text")]
    pub mentor_review_status: String,

    #[sea_orm(column_type = "Text")]
    pub status: String,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// Get the submission status as an enum
    pub fn submission_status(&self) -> SubmissionStatus {
        SubmissionStatus::from(self.status.clone())
    }

    /// Get the mentor review disposition as an enum
    pub fn mentor_status(&self) -> MentorReviewStatus {
        MentorReviewStatus::from(self.mentor_review_status.clone())
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::assignment::Entity")]
    Assignments,

    #[sea_orm(has_many = "super::review::Entity")]
    Reviews,
}

impl Related<super::assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignments.def()
    }
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
