//! Custom error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed or out-of-range input
    #[error("{0}")]
    Validation(String),

    /// Uniqueness violation (duplicate email or custom URL)
    #[error("{0}")]
    Conflict(String),

    /// Missing, invalid, or expired credentials
    #[error("{0}")]
    Authentication(String),

    /// Resource absent, or hidden for privacy
    #[error("Not found")]
    NotFound,

    /// Too many attempts from one client
    #[error("Too many attempts, please try again later")]
    RateLimited,

    /// Database error
    #[error("Database error")]
    Database(#[from] sqlx::Error),

    /// Unexpected internal failure
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Map a repository error, translating a unique-index hit on the given
    /// constraint into a conflict with `message`.
    pub fn from_repo(err: anyhow::Error, constraint: &str, message: &str) -> ApiError {
        if is_unique_violation(&err, constraint) {
            return ApiError::Conflict(message.to_string());
        }
        ApiError::Internal(err)
    }
}

/// Whether `err` wraps a unique-constraint violation on `constraint`
pub fn is_unique_violation(err: &anyhow::Error, constraint: &str) -> bool {
    if let Some(sqlx::Error::Database(db_err)) = err.downcast_ref::<sqlx::Error>() {
        return db_err.is_unique_violation() && db_err.constraint() == Some(constraint);
    }
    false
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Authentication(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many attempts, please try again later".to_string(),
            ),
            ApiError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::Internal(e) => {
                tracing::error!("Internal server error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
