//! SeaORM entity models
//!
//! Database entities for the peer review engine

mod assignment;
mod review;
mod reviewer;
mod submission;

pub use submission::{
    ActiveModel as SubmissionActiveModel, Column as SubmissionColumn, Entity as SubmissionEntity,
    MentorReviewStatus, Model as Submission, SubmissionStatus,
};

pub use reviewer::{
    ActiveModel as ReviewerActiveModel, Column as ReviewerColumn, Entity as ReviewerEntity,
    Model as Reviewer, ReviewerRole,
};

pub use assignment::{
    ActiveModel as AssignmentActiveModel, AssignmentKind, AssignmentStatus,
    Column as AssignmentColumn, Entity as AssignmentEntity, Model as Assignment,
};

pub use review::{
    ActiveModel as ReviewActiveModel, Column as ReviewColumn, Disposition, Entity as ReviewEntity,
    Model as Review,
};
