//! # Value Errors
//!
//! Failures while building references or converting store timestamps.

use thiserror::Error;

/// Result type for value-model operations
pub type ValueResult<T> = Result<T, ValueError>;

/// Value-model errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// Path is not `collection/id[/collection/id...]`
    #[error("Invalid document path '{path}': {reason}")]
    InvalidPath { path: String, reason: &'static str },

    /// Timestamp cannot be represented as a UTC date-time
    #[error("Timestamp out of range: {seconds}s {nanos}ns")]
    TimestampOutOfRange { seconds: i64, nanos: i32 },
}
