//! Tagged value cells

use std::collections::BTreeMap;
use std::fmt;

use super::reference::DocumentRef;
use super::timestamp::Timestamp;

/// Raw field map of one document
pub type ValueMap = BTreeMap<String, Value>;

/// One value cell as produced or consumed by the store
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Timestamp(Timestamp),
    Reference(DocumentRef),
    List(Vec<Value>),
    Map(ValueMap),
}

/// Discriminant of a `Value`, used as the source key of coercions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueTag {
    Null,
    String,
    Integer,
    Float,
    Boolean,
    Timestamp,
    Reference,
    List,
    Map,
}

impl ValueTag {
    /// Returns the tag name for error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueTag::Null => "null",
            ValueTag::String => "string",
            ValueTag::Integer => "integer",
            ValueTag::Float => "float",
            ValueTag::Boolean => "boolean",
            ValueTag::Timestamp => "timestamp",
            ValueTag::Reference => "reference",
            ValueTag::List => "list",
            ValueTag::Map => "map",
        }
    }
}

impl fmt::Display for ValueTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Value {
    pub fn tag(&self) -> ValueTag {
        match self {
            Value::Null => ValueTag::Null,
            Value::String(_) => ValueTag::String,
            Value::Integer(_) => ValueTag::Integer,
            Value::Float(_) => ValueTag::Float,
            Value::Boolean(_) => ValueTag::Boolean,
            Value::Timestamp(_) => ValueTag::Timestamp,
            Value::Reference(_) => ValueTag::Reference,
            Value::List(_) => ValueTag::List,
            Value::Map(_) => ValueTag::Map,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.tag().as_str()
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::String(s) => write!(f, "{}", s),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Timestamp(ts) => write!(f, "{}", ts),
            Value::Reference(r) => write!(f, "{}", r),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, item)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<Timestamp> for Value {
    fn from(ts: Timestamp) -> Self {
        Value::Timestamp(ts)
    }
}

impl From<DocumentRef> for Value {
    fn from(r: DocumentRef) -> Self {
        Value::Reference(r)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<ValueMap> for Value {
    fn from(map: ValueMap) -> Self {
        Value::Map(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags() {
        assert_eq!(Value::Null.tag(), ValueTag::Null);
        assert_eq!(Value::from("a").tag(), ValueTag::String);
        assert_eq!(Value::from(1i64).tag(), ValueTag::Integer);
        assert_eq!(Value::from(1.5).tag(), ValueTag::Float);
        assert_eq!(Value::List(vec![]).tag(), ValueTag::List);
        assert_eq!(Value::Map(ValueMap::new()).type_name(), "map");
    }

    #[test]
    fn test_display_stringifies_scalars() {
        assert_eq!(Value::from("plain").to_string(), "plain");
        assert_eq!(Value::from(42i64).to_string(), "42");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::Null.to_string(), "null");
    }

    #[test]
    fn test_display_nested() {
        let mut map = ValueMap::new();
        map.insert("b".into(), Value::from(2i64));
        map.insert("a".into(), Value::List(vec![Value::from("x"), Value::from(1i64)]));
        assert_eq!(Value::Map(map).to_string(), "{a: [x, 1], b: 2}");
    }
}
