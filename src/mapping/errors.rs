//! # Mapping Errors
//!
//! Umbrella error for every mapping, store-facing and listener operation.
//!
//! Error codes:
//! - DOCSYNC_UNREGISTERED_TYPE (FATAL, configuration)
//! - DOCSYNC_SCHEMA_INVALID (FATAL, configuration)
//! - DOCSYNC_MISSING_FIELD (strict mode only)
//! - DOCSYNC_INVALID_TYPE (strict mode only)
//! - DOCSYNC_NOT_FOUND
//! - DOCSYNC_STORE_FAILED
//! - DOCSYNC_LISTENER_FAILED

use thiserror::Error;

use crate::incident::{Incident, IncidentKind};
use crate::listener::ListenerError;
use crate::schema::SchemaError;
use crate::store::StoreError;
use crate::value::DocumentRef;

/// Result type for mapping operations
pub type MappingResult<T> = Result<T, MappingError>;

/// Mapping errors
#[derive(Debug, Clone, Error)]
pub enum MappingError {
    /// Registry misconfiguration
    #[error("Configuration error: {0}")]
    Schema(#[from] SchemaError),

    /// Incident raised in strict mode
    #[error("Mapping error: {0}")]
    Incident(Incident),

    /// Requested document does not exist
    #[error("Document not found: {0}")]
    NotFound(DocumentRef),

    /// Store driver failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Snapshot listener failure
    #[error("Listener error: {0}")]
    Listener(#[from] ListenerError),
}

impl MappingError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            MappingError::Schema(SchemaError::UnregisteredType { .. }) => {
                "DOCSYNC_UNREGISTERED_TYPE"
            }
            MappingError::Schema(_) => "DOCSYNC_SCHEMA_INVALID",
            MappingError::Incident(incident) => match incident.kind() {
                IncidentKind::MissingField => "DOCSYNC_MISSING_FIELD",
                IncidentKind::InvalidType => "DOCSYNC_INVALID_TYPE",
            },
            MappingError::NotFound(_) => "DOCSYNC_NOT_FOUND",
            MappingError::Store(_) => "DOCSYNC_STORE_FAILED",
            MappingError::Listener(_) => "DOCSYNC_LISTENER_FAILED",
        }
    }

    /// Configuration errors must stop the process; they are never retried.
    pub fn is_fatal(&self) -> bool {
        matches!(self, MappingError::Schema(_))
    }

    /// The incident behind a strict-mode failure
    pub fn incident(&self) -> Option<&Incident> {
        match self {
            MappingError::Incident(incident) => Some(incident),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn doc() -> DocumentRef {
        DocumentRef::new("users", "u1").unwrap()
    }

    #[test]
    fn test_error_codes() {
        let err = MappingError::from(SchemaError::UnregisteredType { type_name: "User" });
        assert_eq!(err.code(), "DOCSYNC_UNREGISTERED_TYPE");
        assert!(err.is_fatal());

        let err = MappingError::Incident(Incident::missing_field(doc(), "User", "name"));
        assert_eq!(err.code(), "DOCSYNC_MISSING_FIELD");
        assert!(!err.is_fatal());

        let err = MappingError::Incident(Incident::invalid_type(
            doc(),
            "User",
            "age",
            "i64",
            Value::from("x"),
        ));
        assert_eq!(err.code(), "DOCSYNC_INVALID_TYPE");
    }

    #[test]
    fn test_incident_error_renders_message() {
        let err = MappingError::Incident(Incident::missing_field(doc(), "User", "name"));
        assert_eq!(
            err.to_string(),
            "Mapping error: <User> Missing field 'name' on users/u1"
        );
        assert!(err.incident().is_some());
    }
}
