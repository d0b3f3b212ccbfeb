//! Field declaration types
//!
//! Supported slot shapes:
//! - map: nested map, passed through unchanged
//! - list: sequence with a coerced element shape
//! - timestamp: store timestamp converted to a UTC date-time
//! - integer / float: numeric conversion
//! - any: assigned as-is

use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether a field must be present and non-null in stored documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Nullability {
    /// Absent or null raises a missing-field incident
    #[default]
    Required,
    /// Absent or null leaves the slot at its default
    Optional,
}

/// Shape of list elements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementShape {
    String,
    Integer,
    Reference,
    Any,
}

impl ElementShape {
    pub fn type_name(&self) -> &'static str {
        match self {
            ElementShape::String => "string",
            ElementShape::Integer => "integer",
            ElementShape::Reference => "reference",
            ElementShape::Any => "any",
        }
    }
}

/// Target shape of a typed slot, the destination key of coercions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Map,
    List(ElementShape),
    Timestamp,
    Integer,
    Float,
    Any,
}

impl Shape {
    /// Returns the shape name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Shape::Map => "map",
            Shape::List(_) => "list",
            Shape::Timestamp => "timestamp",
            Shape::Integer => "integer",
            Shape::Float => "float",
            Shape::Any => "any",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::List(element) => write!(f, "list<{}>", element.type_name()),
            other => write!(f, "{}", other.type_name()),
        }
    }
}
