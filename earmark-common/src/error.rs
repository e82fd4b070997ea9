//! Common error types for Earmark

use thiserror::Error;

/// Common result type for Earmark operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across Earmark services
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Supplied path does not exist or is the wrong type
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Audio data could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Request rejected before any state change
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
