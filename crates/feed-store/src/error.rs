//! Error types for the storage layer and the service model built on it.

use feed_core::{ContentError, MsgId};
use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during storage and service operations.
///
/// Caller-visible rejections (`InvalidContent`, `MsgNotFound`) never leave a
/// partial write behind.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database connection or query error.
    #[error("database connection error: {0}")]
    Connection(#[from] sqlx::Error),

    /// Message not found.
    #[error("message not found: {0}")]
    MsgNotFound(MsgId),

    /// A message with this id already exists.
    #[error("duplicate message: {0}")]
    DuplicateMsg(MsgId),

    /// Message content was rejected.
    #[error("invalid content: {0}")]
    InvalidContent(#[from] ContentError),

    /// A stored row could not be turned back into a domain value.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    /// Migration error.
    #[error("migration error: {0}")]
    MigrationError(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl StoreError {
    /// Whether the error was caused by the request rather than the backend.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::MsgNotFound(_) | Self::InvalidContent(_))
    }
}
