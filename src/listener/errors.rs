//! # Listener Errors

use thiserror::Error;

/// Result type for listener operations
pub type ListenerResult<T> = Result<T, ListenerError>;

/// Snapshot listener errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListenerError {
    /// `fetch_and_listen` called on a listener that is already attached
    #[error("Listener already attached")]
    AlreadyListening,

    /// Subscription ended before the first snapshot arrived
    #[error("Snapshot stream ended before the initial fetch completed")]
    StreamEnded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            ListenerError::AlreadyListening.to_string(),
            "Listener already attached"
        );
    }
}
