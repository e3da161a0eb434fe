//! Peerflow Common Library
//!
//! Shared code for the peerflow services including:
//! - Database models and repository patterns
//! - Error types and handling
//! - Configuration management
//! - Notification collaborator client
//! - Metrics and observability

pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod notify;

// Re-export commonly used types
pub use config::AppConfig;
pub use db::{Repository, ReviewerCandidate};
pub use errors::{AppError, Result};
pub use notify::{Notification, Notifier};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default number of peer reviewers requested per submission
pub const DEFAULT_PEER_REVIEWERS: usize = 2;
