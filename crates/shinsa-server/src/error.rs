//! Error types for shinsa-server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use shinsa::WorkflowError;
use thiserror::Error;

/// Startup and serving errors
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Logging could not be initialised
    #[error("Logging error: {0}")]
    Logging(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// API-specific errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found
    #[error("{0}")]
    NotFound(String),

    /// Bad request
    #[error("{0}")]
    BadRequest(String),

    /// Concurrent modification
    #[error("{0}")]
    Conflict(String),

    /// Storage not configured or not reachable
    #[error("{0}")]
    Unavailable(String),

    /// Internal error
    #[error("{0}")]
    Internal(String),
}

impl From<WorkflowError> for ApiError {
    fn from(error: WorkflowError) -> Self {
        let message = error.to_string();
        match error {
            WorkflowError::NotFound { .. } => ApiError::NotFound(message),
            WorkflowError::InvalidArgument(_) | WorkflowError::InvalidTemplate(_) => {
                ApiError::BadRequest(message)
            }
            WorkflowError::ServiceUnavailable(_) => ApiError::Unavailable(message),
            WorkflowError::Conflict(_) => ApiError::Conflict(message),
            _ => ApiError::Internal(message),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unavailable(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::warn!(status = %status, "{}", self);
        }

        let body = ErrorResponse {
            detail: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;
