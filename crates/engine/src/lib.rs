//! Peerflow Review Engine
//!
//! The algorithmic core of the peer review system:
//! - [`rubric`] - weighted rubric scoring with threshold dispositions
//! - [`ranking`] - load-balanced reviewer selection (rank, widen, shuffle)
//! - [`lifecycle`] - the assignment state machine
//! - [`assign`] - reviewer assignment batches
//! - [`intake`] - scored review submission
//! - [`readiness`] - merge-readiness derivation
//!
//! Persistence goes through the [`store::ReviewStore`] seam; the engine
//! itself never talks SQL.

pub mod assign;
pub mod intake;
pub mod lifecycle;
pub mod ranking;
pub mod readiness;
pub mod rubric;
pub mod store;

pub use assign::{AssignmentBatch, AssignmentEngine};
pub use intake::{IntakeOutcome, ReviewIntake, ReviewNotes};
pub use readiness::Readiness;
pub use rubric::{RubricOutcome, RubricWeights, SubScores};
pub use store::ReviewStore;
