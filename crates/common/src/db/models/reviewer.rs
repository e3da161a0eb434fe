//! Reviewer entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Reviewer role. Admins are reserved for mentor review and are never
/// selected by the peer ranking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewerRole {
    Member,
    Admin,
}

impl From<String> for ReviewerRole {
    fn from(s: String) -> Self {
        match s.as_str() {
            "admin" => ReviewerRole::Admin,
            _ => ReviewerRole::Member,
        }
    }
}

impl From<ReviewerRole> for String {
    fn from(role: ReviewerRole) -> Self {
        match role {
            ReviewerRole::Member => "member".to_string(),
            ReviewerRole::Admin => "admin".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reviewers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(column_type = "Text", unique)]
    pub handle: String,

    #[sea_orm(column_type = "Text")]
    pub role: String,

    pub is_active: bool,

    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    /// Get the reviewer role as an enum
    pub fn reviewer_role(&self) -> ReviewerRole {
        ReviewerRole::from(self.role.clone())
    }

    /// Check whether this reviewer may submit mentor reviews
    pub fn is_admin(&self) -> bool {
        self.reviewer_role() == ReviewerRole::Admin
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
