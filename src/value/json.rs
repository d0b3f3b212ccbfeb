//! Bridge between `serde_json::Value` and the store value model
//!
//! JSON has no timestamp or reference type, so the bridge is lossy in one
//! direction: timestamps render as RFC 3339 strings and references as their
//! path when converted to JSON, and come back as plain strings.

use serde_json::{Map, Number};

use super::types::{Value, ValueMap};

impl Value {
    /// Convert a JSON value. Integral numbers that fit `i64` become
    /// `Integer`, every other number becomes `Float`.
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert a JSON object into a field map. Non-object input yields `None`.
    pub fn map_from_json(json: serde_json::Value) -> Option<ValueMap> {
        match Value::from_json(json) {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Integer(i) => serde_json::Value::Number((*i).into()),
            // NaN and infinities have no JSON form
            Value::Float(x) => Number::from_f64(*x)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Timestamp(ts) => serde_json::Value::String(ts.to_string()),
            Value::Reference(r) => serde_json::Value::String(r.path().to_string()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(map) => {
                let mut out = Map::new();
                for (k, v) in map {
                    out.insert(k.clone(), v.to_json());
                }
                serde_json::Value::Object(out)
            }
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::from_json(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{DocumentRef, Timestamp};
    use serde_json::json;

    #[test]
    fn test_numbers_keep_their_kind() {
        assert_eq!(Value::from_json(json!(3)), Value::Integer(3));
        assert_eq!(Value::from_json(json!(3.5)), Value::Float(3.5));
        assert_eq!(Value::from_json(json!(u64::MAX)), Value::Float(u64::MAX as f64));
    }

    #[test]
    fn test_object_becomes_map() {
        let map = Value::map_from_json(json!({"name": "Alice", "tags": ["a", "b"]})).unwrap();
        assert_eq!(map["name"], Value::from("Alice"));
        assert_eq!(
            map["tags"],
            Value::List(vec![Value::from("a"), Value::from("b")])
        );
    }

    #[test]
    fn test_non_object_is_not_a_map() {
        assert!(Value::map_from_json(json!([1, 2])).is_none());
    }

    #[test]
    fn test_to_json_renders_store_types_as_strings() {
        let r = DocumentRef::new("users", "alice").unwrap();
        assert_eq!(Value::Reference(r).to_json(), json!("users/alice"));
        assert_eq!(
            Value::Timestamp(Timestamp::new(0, 0)).to_json(),
            json!("1970-01-01T00:00:00+00:00")
        );
        assert_eq!(Value::Float(f64::NAN).to_json(), json!(null));
    }
}
