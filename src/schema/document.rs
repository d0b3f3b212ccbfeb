//! Document types
//!
//! A document type is any `Default` struct that lists its persisted fields.
//! Identity (the document reference) and decode incidents live beside the
//! typed data in `mapping::Record`, so document structs stay plain data.

use std::any::Any;

use super::field::FieldDef;
use crate::value::ValueMap;

/// A typed, persisted document
///
/// ```ignore
/// #[derive(Default)]
/// struct User {
///     name: String,
///     age: Option<i64>,
/// }
///
/// impl Document for User {
///     fn fields() -> Vec<FieldDef<Self>> {
///         vec![
///             FieldDef::required("name", |u: &User| &u.name, |u: &mut User| &mut u.name),
///             FieldDef::optional("age", |u: &User| &u.age, |u: &mut User| &mut u.age),
///         ]
///     }
/// }
/// ```
pub trait Document: Default + Send + Sync + 'static {
    /// Persisted fields in declaration order. An empty list selects
    /// passthrough mode: the raw map is stored verbatim via `absorb_raw`.
    fn fields() -> Vec<FieldDef<Self>>;

    /// Name used in diagnostics.
    fn type_name() -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Receive the whole raw map in passthrough mode.
    fn absorb_raw(&mut self, _raw: ValueMap) {}

    /// Raw map held in passthrough mode, encoded back verbatim.
    fn raw(&self) -> Option<&ValueMap> {
        None
    }
}

/// Object-safe view of any document, used to encode by runtime type
pub trait AnyDocument: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn document_type_name(&self) -> &'static str;
}

impl<T: Document> AnyDocument for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn document_type_name(&self) -> &'static str {
        T::type_name()
    }
}

/// Untyped document holding the raw field map as-is
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UntypedDocument {
    pub data: ValueMap,
}

impl Document for UntypedDocument {
    fn fields() -> Vec<FieldDef<Self>> {
        Vec::new()
    }

    fn absorb_raw(&mut self, raw: ValueMap) {
        self.data = raw;
    }

    fn raw(&self) -> Option<&ValueMap> {
        Some(&self.data)
    }
}

/// Strip the module path from a type name, keeping generic arguments intact.
pub fn short_type_name(full: &'static str) -> &'static str {
    let base_end = full.find('<').unwrap_or(full.len());
    match full[..base_end].rfind("::") {
        Some(pos) => &full[pos + 2..],
        None => full,
    }
}
