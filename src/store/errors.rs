//! # Store Errors

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Document store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Document already exists: {0}")]
    AlreadyExists(String),

    #[error("Store closed")]
    Closed,

    #[error("Backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::AlreadyExists(_) => "STORE_ALREADY_EXISTS",
            StoreError::Closed => "STORE_CLOSED",
            StoreError::Backend(_) => "STORE_BACKEND",
        }
    }
}
