//! API handlers module

pub mod assignments;
pub mod health;
pub mod readiness;
pub mod reviews;
