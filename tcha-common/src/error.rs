//! Common error types for TchaMusic

use thiserror::Error;

/// Common result type for TchaMusic operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the store, the workflows and the HTTP layer
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON column could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Caller has no valid session
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Caller is authenticated but does not own the resource
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource already exists in the requested state
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Uploaded payload exceeds the configured cap
    #[error("Payload too large: {size} bytes exceeds limit of {limit} bytes")]
    PayloadTooLarge { size: u64, limit: u64 },

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
