//! Typed slots
//!
//! A slot is the Rust type of one persisted field. The trait ties the type
//! to its target [`Shape`] and provides the strict conversions used by the
//! field accessors: coercion has already happened by the time `from_value`
//! runs, so a mismatch here is an invalid-type incident.

use chrono::{DateTime, Utc};

use super::types::{ElementShape, Shape};
use crate::value::{DocumentRef, Timestamp, Value, ValueMap};

/// Rust type that can hold one mapped field
pub trait Slot: Sized + Send + Sync + 'static {
    /// Target shape used to pick the coercion
    const SHAPE: Shape;
    /// Name used in diagnostics
    const TYPE_NAME: &'static str;

    fn to_value(&self) -> Value;

    /// Take a coerced value. The value is handed back unchanged on mismatch.
    fn from_value(value: Value) -> Result<Self, Value>;
}

impl Slot for String {
    const SHAPE: Shape = Shape::Any;
    const TYPE_NAME: &'static str = "String";

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(other),
        }
    }
}

impl Slot for bool {
    const SHAPE: Shape = Shape::Any;
    const TYPE_NAME: &'static str = "bool";

    fn to_value(&self) -> Value {
        Value::Boolean(*self)
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Boolean(b) => Ok(b),
            other => Err(other),
        }
    }
}

impl Slot for i64 {
    const SHAPE: Shape = Shape::Integer;
    const TYPE_NAME: &'static str = "i64";

    fn to_value(&self) -> Value {
        Value::Integer(*self)
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Integer(i) => Ok(i),
            other => Err(other),
        }
    }
}

impl Slot for i32 {
    const SHAPE: Shape = Shape::Integer;
    const TYPE_NAME: &'static str = "i32";

    fn to_value(&self) -> Value {
        Value::Integer(i64::from(*self))
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Integer(i) => i32::try_from(i).map_err(|_| Value::Integer(i)),
            other => Err(other),
        }
    }
}

impl Slot for f64 {
    const SHAPE: Shape = Shape::Float;
    const TYPE_NAME: &'static str = "f64";

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Float(x) => Ok(x),
            other => Err(other),
        }
    }
}

impl Slot for DateTime<Utc> {
    const SHAPE: Shape = Shape::Timestamp;
    const TYPE_NAME: &'static str = "DateTime<Utc>";

    fn to_value(&self) -> Value {
        Value::Timestamp(Timestamp::from_datetime(self))
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Timestamp(ts) => ts.to_datetime().map_err(|_| Value::Timestamp(ts)),
            other => Err(other),
        }
    }
}

impl Slot for DocumentRef {
    const SHAPE: Shape = Shape::Any;
    const TYPE_NAME: &'static str = "DocumentRef";

    fn to_value(&self) -> Value {
        Value::Reference(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Reference(r) => Ok(r),
            other => Err(other),
        }
    }
}

impl Slot for ValueMap {
    const SHAPE: Shape = Shape::Map;
    const TYPE_NAME: &'static str = "ValueMap";

    fn to_value(&self) -> Value {
        Value::Map(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Map(map) => Ok(map),
            other => Err(other),
        }
    }
}

impl Slot for Value {
    const SHAPE: Shape = Shape::Any;
    const TYPE_NAME: &'static str = "Value";

    fn to_value(&self) -> Value {
        self.clone()
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        Ok(value)
    }
}

/// `Option<S>` encodes `None` as null. Decode never hands it a null, since
/// absent and null values skip the setter entirely.
impl<S: Slot> Slot for Option<S> {
    const SHAPE: Shape = S::SHAPE;
    const TYPE_NAME: &'static str = S::TYPE_NAME;

    fn to_value(&self) -> Value {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Null => Ok(None),
            other => S::from_value(other).map(Some),
        }
    }
}

/// Collect a list value element by element, handing the whole list back if
/// any element does not fit.
fn collect_list<E, F>(value: Value, convert: F) -> Result<Vec<E>, Value>
where
    F: Fn(&Value) -> Option<E>,
{
    let items = match value {
        Value::List(items) => items,
        other => return Err(other),
    };

    let mut out = Vec::with_capacity(items.len());
    for item in &items {
        match convert(item) {
            Some(converted) => out.push(converted),
            None => return Err(Value::List(items)),
        }
    }
    Ok(out)
}

macro_rules! list_slot {
    ($elem:ty, $shape:expr, $name:expr, |$v:ident| $convert:expr) => {
        impl Slot for Vec<$elem> {
            const SHAPE: Shape = Shape::List($shape);
            const TYPE_NAME: &'static str = $name;

            fn to_value(&self) -> Value {
                Value::List(self.iter().map(Slot::to_value).collect())
            }

            fn from_value(value: Value) -> Result<Self, Value> {
                collect_list(value, |$v| $convert)
            }
        }
    };
}

list_slot!(String, ElementShape::String, "Vec<String>", |v| v
    .as_str()
    .map(str::to_string));
list_slot!(i64, ElementShape::Integer, "Vec<i64>", |v| v.as_i64());
list_slot!(i32, ElementShape::Integer, "Vec<i32>", |v| v
    .as_i64()
    .and_then(|i| i32::try_from(i).ok()));
list_slot!(DocumentRef, ElementShape::Reference, "Vec<DocumentRef>", |v| match v {
    Value::Reference(r) => Some(r.clone()),
    _ => None,
});
list_slot!(Value, ElementShape::Any, "Vec<Value>", |v| Some(v.clone()));
