//! Error types for Peerflow services
//!
//! Provides a comprehensive error handling system with:
//! - Distinct error types for different failure modes
//! - HTTP status code mapping
//! - Structured error responses
//! - Error codes for client handling
//!
//! Business-rule violations (self review, duplicate review, no eligible
//! reviewers, invalid lifecycle transitions) are named variants that callers
//! branch on, never generic 500s.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (1xxx)
    ValidationError,
    MissingField,
    InvalidScore,

    // Authorization errors (3xxx)
    Forbidden,
    SelfReviewForbidden,

    // Resource errors (4xxx)
    NotFound,
    SubmissionNotFound,
    ReviewerNotFound,
    AssignmentNotFound,

    // Conflict errors (5xxx)
    DuplicateReview,

    // Business-rule errors (6xxx)
    NoEligibleReviewers,
    InvalidTransition,

    // Database errors (7xxx)
    DatabaseError,
    ConnectionError,

    // External service errors (8xxx)
    NotifyError,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
    SerializationError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            // Validation (1xxx)
            ErrorCode::ValidationError => 1001,
            ErrorCode::MissingField => 1002,
            ErrorCode::InvalidScore => 1003,

            // Authz (3xxx)
            ErrorCode::Forbidden => 3001,
            ErrorCode::SelfReviewForbidden => 3002,

            // Resources (4xxx)
            ErrorCode::NotFound => 4001,
            ErrorCode::SubmissionNotFound => 4002,
            ErrorCode::ReviewerNotFound => 4003,
            ErrorCode::AssignmentNotFound => 4004,

            // Conflicts (5xxx)
            ErrorCode::DuplicateReview => 5001,

            // Business rules (6xxx)
            ErrorCode::NoEligibleReviewers => 6001,
            ErrorCode::InvalidTransition => 6002,

            // Database (7xxx)
            ErrorCode::DatabaseError => 7001,
            ErrorCode::ConnectionError => 7002,

            // External (8xxx)
            ErrorCode::NotifyError => 8001,

            // Internal (9xxx)
            ErrorCode::InternalError => 9001,
            ErrorCode::ConfigurationError => 9002,
            ErrorCode::SerializationError => 9003,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("Required field missing: {field}")]
    MissingField { field: String },

    #[error("Invalid score for {field}: {value} is outside [0, 100]")]
    InvalidScore { field: String, value: i64 },

    // Authorization errors
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Reviewers may not review their own submission")]
    SelfReviewForbidden,

    // Resource errors
    #[error("Submission not found: {id}")]
    SubmissionNotFound { id: String },

    #[error("Reviewer not found: {id}")]
    ReviewerNotFound { id: String },

    #[error("Assignment not found: {id}")]
    AssignmentNotFound { id: String },

    // Conflict errors
    #[error("A review already exists for this submission and reviewer: {existing_review_id}")]
    DuplicateReview { existing_review_id: Uuid },

    // Business-rule errors
    #[error("No eligible reviewers for submission {submission_id}")]
    NoEligibleReviewers { submission_id: Uuid },

    #[error("Invalid assignment transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Database connection error: {message}")]
    DatabaseConnection { message: String },

    // External service errors
    #[error("Notification dispatch failed: {message}")]
    NotifyError { message: String },

    // Internal errors
    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::MissingField { .. } => ErrorCode::MissingField,
            AppError::InvalidScore { .. } => ErrorCode::InvalidScore,
            AppError::Forbidden { .. } => ErrorCode::Forbidden,
            AppError::SelfReviewForbidden => ErrorCode::SelfReviewForbidden,
            AppError::SubmissionNotFound { .. } => ErrorCode::SubmissionNotFound,
            AppError::ReviewerNotFound { .. } => ErrorCode::ReviewerNotFound,
            AppError::AssignmentNotFound { .. } => ErrorCode::AssignmentNotFound,
            AppError::DuplicateReview { .. } => ErrorCode::DuplicateReview,
            AppError::NoEligibleReviewers { .. } => ErrorCode::NoEligibleReviewers,
            AppError::InvalidTransition { .. } => ErrorCode::InvalidTransition,
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::DatabaseConnection { .. } => ErrorCode::ConnectionError,
            AppError::NotifyError { .. } => ErrorCode::NotifyError,
            AppError::Internal { .. } => ErrorCode::InternalError,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
            AppError::Serialization(_) => ErrorCode::SerializationError,
            AppError::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation { .. }
            | AppError::MissingField { .. }
            | AppError::InvalidScore { .. } => StatusCode::BAD_REQUEST,

            // 403 Forbidden
            AppError::Forbidden { .. } | AppError::SelfReviewForbidden => StatusCode::FORBIDDEN,

            // 404 Not Found
            AppError::SubmissionNotFound { .. }
            | AppError::ReviewerNotFound { .. }
            | AppError::AssignmentNotFound { .. } => StatusCode::NOT_FOUND,

            // 409 Conflict
            AppError::DuplicateReview { .. } => StatusCode::CONFLICT,

            // 422 Unprocessable Entity
            AppError::NoEligibleReviewers { .. } | AppError::InvalidTransition { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }

            // 500 Internal Server Error
            AppError::Database(_)
            | AppError::DatabaseConnection { .. }
            | AppError::Internal { .. }
            | AppError::Configuration { .. }
            | AppError::Serialization(_)
            | AppError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,

            // 502 Bad Gateway
            AppError::NotifyError { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Check if this error is a client error
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Extra machine-readable details for the response body.
    ///
    /// DuplicateReview carries the existing review id so clients can display
    /// the prior review instead of erroring blindly.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::DuplicateReview { existing_review_id } => Some(serde_json::json!({
                "existing_review_id": existing_review_id,
            })),
            AppError::InvalidTransition { from, to } => Some(serde_json::json!({
                "from": from,
                "to": to,
            })),
            _ => None,
        }
    }
}

/// Structured error response for API
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let details = self.details();
        let message = self.to_string();

        // Log based on severity
        if self.is_server_error() {
            tracing::error!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Server error"
            );
        } else if self.is_client_error() {
            tracing::warn!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Client error"
            );
        }

        let body = ErrorResponse {
            error: ErrorDetails {
                code,
                message,
                details,
                request_id: None, // Filled by middleware
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::NotifyError {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_mapping() {
        let err = AppError::SubmissionNotFound { id: "test".into() };
        assert_eq!(err.code(), ErrorCode::SubmissionNotFound);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_business_rule_errors_are_client_errors() {
        let id = Uuid::new_v4();
        let err = AppError::DuplicateReview {
            existing_review_id: id,
        };
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert!(err.is_client_error());
        assert_eq!(
            err.details().unwrap()["existing_review_id"],
            serde_json::json!(id)
        );

        let err = AppError::SelfReviewForbidden;
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

        let err = AppError::NoEligibleReviewers {
            submission_id: Uuid::new_v4(),
        };
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_invalid_transition_names_both_states() {
        let err = AppError::InvalidTransition {
            from: "declined".into(),
            to: "completed".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("declined"));
        assert!(msg.contains("completed"));
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_server_error() {
        let err = AppError::Internal {
            message: "Something went wrong".into(),
        };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.is_server_error());
    }
}
