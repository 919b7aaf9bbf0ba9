use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource missing or hidden by the visibility policy.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Path escapes the trusted root or cannot be canonicalized.
    #[error("Path rejected: {0}")]
    PathRejected(String),

    /// Malformed request (missing query parameter, undecodable path).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Client errors carry no body; details are only logged.
        match &self {
            AppError::NotFound(_) | AppError::PathRejected(_) => {
                tracing::info!(error = %self, "Request rejected");
                StatusCode::NOT_FOUND.into_response()
            }
            AppError::BadRequest(_) => {
                tracing::warn!(error = %self, "Bad request");
                StatusCode::BAD_REQUEST.into_response()
            }
            _ => {
                tracing::error!(error = %self, "Request error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
            }
        }
    }
}

/// Result type alias for the application.
pub type Result<T> = std::result::Result<T, AppError>;
