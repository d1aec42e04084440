//! Error types for carnet-core

use thiserror::Error;

/// Result type alias using carnet-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in carnet-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Secure storage read/write/delete failure
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Stored user profile is missing required fields or is not valid JSON
    #[error("Malformed user profile: {0}")]
    MalformedProfile(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    Validation(String),

    /// HTTP transport error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend rejected the request
    #[error("API error: {0}")]
    Api(String),

    /// Backend rejected the bearer token
    #[error("Session expired or invalid, sign in again")]
    Unauthorized,

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Client configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Failure reported by a [`SecurePersistence`](crate::session::SecurePersistence) backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{operation} `{key}` failed: {message}")]
pub struct StorageError {
    pub operation: StorageOperation,
    pub key: String,
    pub message: String,
}

impl StorageError {
    pub fn new(operation: StorageOperation, key: &str, message: impl Into<String>) -> Self {
        Self {
            operation,
            key: key.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageOperation {
    Read,
    Write,
    Delete,
}

impl std::fmt::Display for StorageOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Delete => "delete",
        };
        f.write_str(label)
    }
}
