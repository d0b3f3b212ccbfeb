//! Coercion table
//!
//! Converts a raw stored value into the shape declared by a slot. The table
//! is keyed by `(ValueTag, Shape)` and exhaustive: every pair either yields a
//! value ready for the slot or a [`CoercionFailure`].
//!
//! | source \ target | map  | list      | timestamp | integer   | float | any  |
//! |-----------------|------|-----------|-----------|-----------|-------|------|
//! | null            | pass | fail      | fail      | fail      | fail  | pass |
//! | string          | pass | fail      | fail      | parse     | fail  | pass |
//! | integer         | pass | fail      | fail      | pass      | widen | pass |
//! | float           | pass | fail      | fail      | round     | pass  | pass |
//! | boolean         | pass | fail      | fail      | 1 / 0     | fail  | pass |
//! | timestamp       | pass | fail      | validate  | fail      | fail  | pass |
//! | reference       | pass | fail      | fail      | fail      | fail  | pass |
//! | list            | pass | elements  | fail      | fail      | fail  | pass |
//! | map             | pass | fail      | fail      | fail      | fail  | pass |
//!
//! Map targets pass the raw value through unchanged; a mismatch there is
//! caught by the slot itself.

use std::fmt;

use crate::schema::{ElementShape, Shape};
use crate::value::{Value, ValueTag};

/// Why a value could not be coerced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoercionFailure {
    NotASequence,
    NotATimestamp,
    TimestampOutOfRange,
    NotNumeric,
    NumericOutOfRange,
    NullElement,
    NotAReference,
}

impl CoercionFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoercionFailure::NotASequence => "not a sequence",
            CoercionFailure::NotATimestamp => "not a timestamp",
            CoercionFailure::TimestampOutOfRange => "timestamp out of range",
            CoercionFailure::NotNumeric => "not numeric",
            CoercionFailure::NumericOutOfRange => "numeric out of range",
            CoercionFailure::NullElement => "null list element",
            CoercionFailure::NotAReference => "not a reference",
        }
    }
}

impl fmt::Display for CoercionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coerce `raw` into `shape`.
pub fn coerce(raw: &Value, shape: Shape) -> Result<Value, CoercionFailure> {
    match shape {
        Shape::Map | Shape::Any => Ok(raw.clone()),
        Shape::List(element) => coerce_list(raw, element),
        Shape::Timestamp => coerce_timestamp(raw),
        Shape::Integer => to_integer(raw).map(Value::Integer),
        Shape::Float => to_float(raw).map(Value::Float),
    }
}

fn coerce_list(raw: &Value, element: ElementShape) -> Result<Value, CoercionFailure> {
    let items = match raw {
        Value::List(items) => items,
        _ => return Err(CoercionFailure::NotASequence),
    };

    items
        .iter()
        .map(|item| coerce_element(item, element))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::List)
}

fn coerce_element(item: &Value, element: ElementShape) -> Result<Value, CoercionFailure> {
    match element {
        ElementShape::String => match item {
            Value::Null => Err(CoercionFailure::NullElement),
            Value::String(_) => Ok(item.clone()),
            other => Ok(Value::String(other.to_string())),
        },
        ElementShape::Integer => match item {
            Value::Null => Err(CoercionFailure::NullElement),
            other => to_integer(other).map(Value::Integer),
        },
        ElementShape::Reference => match item {
            Value::Reference(_) => Ok(item.clone()),
            Value::Null => Err(CoercionFailure::NullElement),
            _ => Err(CoercionFailure::NotAReference),
        },
        ElementShape::Any => Ok(item.clone()),
    }
}

fn coerce_timestamp(raw: &Value) -> Result<Value, CoercionFailure> {
    match raw {
        Value::Timestamp(ts) => ts
            .to_datetime()
            .map(|_| raw.clone())
            .map_err(|_| CoercionFailure::TimestampOutOfRange),
        _ => Err(CoercionFailure::NotATimestamp),
    }
}

/// Numeric conversion into `i64`.
///
/// Floats round half to even and must land inside the `i64` range; strings
/// are parsed after trimming; booleans become 1 or 0.
pub fn to_integer(raw: &Value) -> Result<i64, CoercionFailure> {
    match raw.tag() {
        ValueTag::Integer => raw.as_i64().ok_or(CoercionFailure::NotNumeric),
        ValueTag::Float => match raw {
            Value::Float(f) => float_to_integer(*f),
            _ => Err(CoercionFailure::NotNumeric),
        },
        ValueTag::String => {
            let s = raw.as_str().ok_or(CoercionFailure::NotNumeric)?.trim();
            s.parse::<i64>().map_err(|_| CoercionFailure::NotNumeric)
        }
        ValueTag::Boolean => match raw {
            Value::Boolean(b) => Ok(i64::from(*b)),
            _ => Err(CoercionFailure::NotNumeric),
        },
        ValueTag::Null
        | ValueTag::Timestamp
        | ValueTag::Reference
        | ValueTag::List
        | ValueTag::Map => Err(CoercionFailure::NotNumeric),
    }
}

fn float_to_integer(f: f64) -> Result<i64, CoercionFailure> {
    if !f.is_finite() {
        return Err(CoercionFailure::NumericOutOfRange);
    }
    let rounded = f.round_ties_even();
    // i64::MAX as f64 rounds up to 2^63, which is already out of range
    if rounded < i64::MIN as f64 || rounded >= i64::MAX as f64 {
        return Err(CoercionFailure::NumericOutOfRange);
    }
    Ok(rounded as i64)
}

fn to_float(raw: &Value) -> Result<f64, CoercionFailure> {
    match raw {
        Value::Float(f) => Ok(*f),
        Value::Integer(i) => Ok(*i as f64),
        _ => Err(CoercionFailure::NotNumeric),
    }
}
