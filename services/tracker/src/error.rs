//! Custom error types for the tracker service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::error::DatabaseError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Failures raised by the data-access layer
#[derive(Error, Debug)]
pub enum StoreError {
    /// The referenced user id is malformed or does not resolve
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Another user already holds this username
    #[error("Username already exists: {0}")]
    DuplicateUsername(String),

    /// Well-formed `YYYY-MM-DD` that is not a calendar date
    #[error("Invalid calendar date: {0}")]
    InvalidDate(String),

    /// Database error
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Type alias for data-access results
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced at the HTTP boundary
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request shape rejected before any store access
    #[error("Validation error: {0}")]
    Validation(&'static str),

    /// Referenced user does not exist
    #[error("User not found")]
    UserNotFound,

    /// Username collision
    #[error("Conflict on username {0}")]
    Conflict(String),

    /// Anything else; details are logged, never sent to the client
    #[error("Unknown error: {0}")]
    Unknown(#[source] StoreError),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UserNotFound(_) => ApiError::UserNotFound,
            StoreError::DuplicateUsername(username) => ApiError::Conflict(username),
            other => ApiError::Unknown(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(message) => {
                warn!("Rejected request: {}", message);
                (StatusCode::BAD_REQUEST, message.to_string())
            }
            ApiError::UserNotFound => (StatusCode::BAD_REQUEST, "User not found".to_string()),
            ApiError::Conflict(username) => (
                StatusCode::CONFLICT,
                format!("Conflict. The username {} already exists.", username),
            ),
            ApiError::Unknown(err) => {
                error!("Request failed: {}", err);
                (StatusCode::BAD_REQUEST, "Unknown cause".to_string())
            }
        };

        let body = Json(json!({
            "message": message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
