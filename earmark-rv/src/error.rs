//! Error types for earmark-rv

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Audio file could not be decoded (422)
    #[error("Decode error: {0}")]
    Decode(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// Domain errors map onto distinct HTTP statuses rather than collapsing
// into a blanket 500.
impl From<earmark_common::Error> for ApiError {
    fn from(err: earmark_common::Error) -> Self {
        use earmark_common::Error;
        match err {
            Error::InvalidPath(_) | Error::Validation(_) => ApiError::BadRequest(err.to_string()),
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::Decode(msg) => ApiError::Decode(msg),
            Error::Io(io) => ApiError::Io(io),
            Error::Config(_) | Error::Internal(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Decode(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "DECODE_ERROR", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            ApiError::Io(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "IO_ERROR",
                err.to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
