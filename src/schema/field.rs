//! Field definitions
//!
//! A `FieldDef<T>` is one persisted property of document type `T`: its
//! stored name, nullability, target shape and a pair of accessors built from
//! plain projection functions. The accessors are the only way the mapping
//! engine touches a document, so decode and encode never introspect types at
//! runtime.

use std::fmt;
use std::sync::Arc;

use super::slot::Slot;
use super::types::{Nullability, Shape};
use crate::value::Value;

type Getter<T> = Arc<dyn Fn(&T) -> Value + Send + Sync>;
type Setter<T> = Arc<dyn Fn(&mut T, Value) -> Result<(), Value> + Send + Sync>;

/// One declared, persisted property of a document type
pub struct FieldDef<T> {
    name: String,
    nullability: Nullability,
    shape: Shape,
    slot_type: &'static str,
    get: Getter<T>,
    set: Setter<T>,
}

impl<T: 'static> FieldDef<T> {
    /// Declare a field stored under `name` and held in the slot reached by
    /// `get` / `get_mut`.
    pub fn new<S: Slot>(
        name: impl Into<String>,
        nullability: Nullability,
        get: fn(&T) -> &S,
        get_mut: fn(&mut T) -> &mut S,
    ) -> Self {
        Self {
            name: name.into(),
            nullability,
            shape: S::SHAPE,
            slot_type: S::TYPE_NAME,
            get: Arc::new(move |doc: &T| get(doc).to_value()),
            set: Arc::new(move |doc: &mut T, value: Value| {
                *get_mut(doc) = S::from_value(value)?;
                Ok(())
            }),
        }
    }

    /// Declare a field that must be present and non-null.
    pub fn required<S: Slot>(
        name: impl Into<String>,
        get: fn(&T) -> &S,
        get_mut: fn(&mut T) -> &mut S,
    ) -> Self {
        Self::new(name, Nullability::Required, get, get_mut)
    }

    /// Declare a field that may be absent or null.
    pub fn optional<S: Slot>(
        name: impl Into<String>,
        get: fn(&T) -> &S,
        get_mut: fn(&mut T) -> &mut S,
    ) -> Self {
        Self::new(name, Nullability::Optional, get, get_mut)
    }
}

impl<T> FieldDef<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nullability(&self) -> Nullability {
        self.nullability
    }

    pub fn is_required(&self) -> bool {
        self.nullability == Nullability::Required
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Rust type of the slot, for diagnostics
    pub fn slot_type(&self) -> &'static str {
        self.slot_type
    }

    /// Read the slot, including `None` as null.
    pub fn read(&self, doc: &T) -> Value {
        (self.get)(doc)
    }

    /// Write an already coerced value. On mismatch the slot is untouched and
    /// the value is handed back.
    pub fn write(&self, doc: &mut T, value: Value) -> Result<(), Value> {
        (self.set)(doc, value)
    }
}

impl<T> Clone for FieldDef<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            nullability: self.nullability,
            shape: self.shape,
            slot_type: self.slot_type,
            get: Arc::clone(&self.get),
            set: Arc::clone(&self.set),
        }
    }
}

impl<T> fmt::Debug for FieldDef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDef")
            .field("name", &self.name)
            .field("nullability", &self.nullability)
            .field("shape", &self.shape)
            .field("slot_type", &self.slot_type)
            .finish()
    }
}
