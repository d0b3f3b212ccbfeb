//! Incident taxonomy

use std::fmt;

use crate::value::{DocumentRef, Value};

/// Kind of a decode incident
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IncidentKind {
    MissingField,
    InvalidType,
}

impl IncidentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentKind::MissingField => "MISSING_FIELD",
            IncidentKind::InvalidType => "INVALID_TYPE",
        }
    }
}

impl fmt::Display for IncidentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A decode-time validation defect of one document
#[derive(Debug, Clone, PartialEq)]
pub enum Incident {
    /// Required field absent or null
    MissingField {
        document: DocumentRef,
        type_name: &'static str,
        field: String,
    },
    /// Present value not coercible to the declared slot
    InvalidType {
        document: DocumentRef,
        type_name: &'static str,
        field: String,
        expected: &'static str,
        raw: Value,
    },
}

impl Incident {
    pub fn missing_field(
        document: DocumentRef,
        type_name: &'static str,
        field: impl Into<String>,
    ) -> Self {
        Incident::MissingField {
            document,
            type_name,
            field: field.into(),
        }
    }

    pub fn invalid_type(
        document: DocumentRef,
        type_name: &'static str,
        field: impl Into<String>,
        expected: &'static str,
        raw: Value,
    ) -> Self {
        Incident::InvalidType {
            document,
            type_name,
            field: field.into(),
            expected,
            raw,
        }
    }

    pub fn kind(&self) -> IncidentKind {
        match self {
            Incident::MissingField { .. } => IncidentKind::MissingField,
            Incident::InvalidType { .. } => IncidentKind::InvalidType,
        }
    }

    pub fn document(&self) -> &DocumentRef {
        match self {
            Incident::MissingField { document, .. } | Incident::InvalidType { document, .. } => {
                document
            }
        }
    }

    pub fn field(&self) -> &str {
        match self {
            Incident::MissingField { field, .. } | Incident::InvalidType { field, .. } => field,
        }
    }

    /// Raw value that failed coercion, if any
    pub fn raw_value(&self) -> Option<&Value> {
        match self {
            Incident::MissingField { .. } => None,
            Incident::InvalidType { raw, .. } => Some(raw),
        }
    }

    /// Rendered diagnostic
    pub fn message(&self) -> String {
        match self {
            Incident::MissingField {
                document,
                type_name,
                field,
            } => format!("<{}> Missing field '{}' on {}", type_name, field, document),
            Incident::InvalidType {
                document,
                field,
                expected,
                raw,
                ..
            } => format!(
                "Invalid value '{}' for field '{}' required type : '{}' on document '{}'",
                raw, field, expected, document
            ),
        }
    }
}

impl fmt::Display for Incident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
