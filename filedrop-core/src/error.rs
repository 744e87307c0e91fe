//! Error types for FileDrop.
//!
//! This module provides the error hierarchy using `thiserror`.
//! Regex errors carry a message that is shown to the requester verbatim.

use thiserror::Error;

/// Result type alias using `FiledropError`.
pub type Result<T> = std::result::Result<T, FiledropError>;

/// Main error type for all FileDrop operations.
#[derive(Debug, Error)]
pub enum FiledropError {
    // ═══════════════════════════════════════════════════════════════════════════
    // QUERY ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Pattern is oversized, contains a forbidden construct, or does not compile.
    #[error("{0}")]
    RegexError(String),

    /// Malformed pagination offset.
    #[error("Invalid query: {0}")]
    QueryError(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // REGISTRY ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Subscription or file absent.
    #[error("Not found: {0}")]
    KeyNotFound(String),

    /// File entry cannot be written to the log.
    #[error("Invalid file entry: {0}")]
    InvalidEntry(String),

    /// Sender is not allowed to register files.
    #[error("Sender {0} is not allowed to register files")]
    Unauthorized(i64),

    /// Backing store failed or is corrupted.
    #[error("Store error: {0}")]
    StoreError(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // SERIALIZATION & STORAGE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// File I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    // ═══════════════════════════════════════════════════════════════════════════
    // CONFIGURATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl FiledropError {
    /// Returns true if the message may be shown to the end user as-is.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, FiledropError::RegexError(_))
    }

    /// Returns true if this error stems from caller-supplied input.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            FiledropError::RegexError(_)
                | FiledropError::QueryError(_)
                | FiledropError::InvalidEntry(_)
        )
    }

    /// Returns true if the requested key does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FiledropError::KeyNotFound(_))
    }
}
