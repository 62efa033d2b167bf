//! Common error types for SongHive

use thiserror::Error;

/// Common result type for SongHive operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the SongHive crates
#[derive(Error, Debug)]
pub enum Error {
    /// MongoDB driver error (connection, query, write)
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    /// Storage-level rejection that did not come from the driver
    #[error("Storage error: {0}")]
    Storage(String),

    /// Document could not be converted between JSON and BSON
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// JSON encode/decode failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Password hashing failure
    #[error("Credential error: {0}")]
    Credentials(String),
}
