//! Review entity - the scored artifact a reviewer produces
//!
//! At most one review per (submission, reviewer) pair; rows are immutable
//! after insert.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Categorical verdict of a review
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// Feedback-only, not yet gradeable (some sub-score missing)
    Pending,
    /// Overall score below the changes threshold
    ChangesRequested,
    /// Passable, neither flagged nor celebrated
    Completed,
    /// Overall score at or above the approval threshold
    Approved,
}

impl Disposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Pending => "pending",
            Disposition::ChangesRequested => "changes_requested",
            Disposition::Completed => "completed",
            Disposition::Approved => "approved",
        }
    }
}

impl From<String> for Disposition {
    fn from(s: String) -> Self {
        match s.as_str() {
            "approved" => Disposition::Approved,
            "changes_requested" => Disposition::ChangesRequested,
            "completed" => Disposition::Completed,
            _ => Disposition::Pending,
        }
    }
}

impl From<Disposition> for String {
    fn from(d: Disposition) -> Self {
        d.as_str().to_string()
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub submission_id: Uuid,

    pub reviewer_id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub kind: String,

    pub functionality: Option<i32>,

    pub code_quality: Option<i32>,

    pub best_practices: Option<i32>,

    pub documentation: Option<i32>,

    /// Weighted overall score at full precision; null when any sub-score
    /// is absent. Presentation rounding happens at the HTTP boundary.
    #[sea_orm(column_type = "Double", nullable)]
    pub overall_score: Option<f64>,

    #[sea_orm(column_type = "Text")]
    pub disposition: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub strengths: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub improvements: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub suggestions: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    /// Get the disposition as an enum
    pub fn review_disposition(&self) -> Disposition {
        Disposition::from(self.disposition.clone())
    }

    /// Overall score rounded to the nearest integer, for presentation
    pub fn overall_rounded(&self) -> Option<i64> {
        self.overall_score.map(|s| s.round() as i64)
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
