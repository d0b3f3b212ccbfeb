//! # Schema Errors
//!
//! Configuration failures raised while building or consulting the registry.
//! All of them are fatal: they indicate a programming error in the set of
//! registered document types, not bad data.

use thiserror::Error;

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Schema registry errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Type requested at mapping time was never registered
    #[error("Document type '{type_name}' is not registered")]
    UnregisteredType { type_name: &'static str },

    /// Type registered twice
    #[error("Document type '{type_name}' is already registered")]
    AlreadyRegistered { type_name: &'static str },

    /// Two fields of one type share a name
    #[error("Document type '{type_name}' declares field '{field}' more than once")]
    DuplicateField {
        type_name: &'static str,
        field: String,
    },

    /// Field declared with an empty name
    #[error("Document type '{type_name}' declares a field with an empty name")]
    EmptyFieldName { type_name: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_names_type() {
        let err = SchemaError::UnregisteredType { type_name: "User" };
        assert!(err.to_string().contains("User"));

        let err = SchemaError::DuplicateField {
            type_name: "User",
            field: "name".into(),
        };
        let display = err.to_string();
        assert!(display.contains("User"));
        assert!(display.contains("name"));
    }
}
