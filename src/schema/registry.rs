//! Schema registry
//!
//! Built once at startup through [`SchemaRegistryBuilder`], then shared
//! read-only (typically behind an `Arc`) by every mapping and listener
//! operation. Lookups are plain `HashMap` reads with no locking.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::definition::CollectionDefinition;
use super::document::{AnyDocument, Document};
use super::errors::{SchemaError, SchemaResult};
use crate::observability::{log_event_with_fields, Event};
use crate::value::ValueMap;

type ErasedEncoder = Box<dyn Fn(&dyn Any) -> Option<ValueMap> + Send + Sync>;

struct RegistryEntry {
    type_name: &'static str,
    definition: Arc<dyn Any + Send + Sync>,
    encode: ErasedEncoder,
}

/// Collects document types before the registry is frozen.
#[derive(Default)]
pub struct SchemaRegistryBuilder {
    entries: HashMap<TypeId, RegistryEntry>,
}

impl SchemaRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and add the definition of `T`.
    ///
    /// # Errors
    ///
    /// - `AlreadyRegistered` if `T` was registered before
    /// - `DuplicateField` / `EmptyFieldName` if `T::fields()` is malformed
    pub fn register<T: Document>(&mut self) -> SchemaResult<&mut Self> {
        let type_id = TypeId::of::<T>();
        if self.entries.contains_key(&type_id) {
            return Err(SchemaError::AlreadyRegistered {
                type_name: T::type_name(),
            });
        }

        let definition = Arc::new(CollectionDefinition::<T>::build()?);
        debug!(
            document_type = definition.type_name(),
            fields = definition.fields().len(),
            passthrough = definition.is_passthrough(),
            "Registered document type"
        );

        let compiled = Arc::clone(&definition);
        let encode: ErasedEncoder = Box::new(move |any: &dyn Any| {
            any.downcast_ref::<T>().map(|doc| compiled.encode(doc))
        });

        self.entries.insert(
            type_id,
            RegistryEntry {
                type_name: definition.type_name(),
                definition,
                encode,
            },
        );
        Ok(self)
    }

    /// Freeze the registry.
    pub fn build(self) -> SchemaRegistry {
        let count = self.entries.len().to_string();
        log_event_with_fields(Event::RegistryBuilt, &[("document_types", &count)]);

        SchemaRegistry {
            entries: self.entries,
        }
    }
}

/// Immutable map from document type to its collection definition
pub struct SchemaRegistry {
    entries: HashMap<TypeId, RegistryEntry>,
}

impl SchemaRegistry {
    pub fn builder() -> SchemaRegistryBuilder {
        SchemaRegistryBuilder::new()
    }

    /// Definition of `T`.
    ///
    /// # Errors
    ///
    /// Returns `UnregisteredType` if `T` was never registered.
    pub fn definition<T: Document>(&self) -> SchemaResult<&CollectionDefinition<T>> {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.definition.downcast_ref::<CollectionDefinition<T>>())
            .ok_or(SchemaError::UnregisteredType {
                type_name: T::type_name(),
            })
    }

    /// Encode a document through the definition of its runtime type.
    ///
    /// # Errors
    ///
    /// Returns `UnregisteredType` if the runtime type was never registered.
    pub fn encode_dyn(&self, doc: &dyn AnyDocument) -> SchemaResult<ValueMap> {
        let any = doc.as_any();
        self.entries
            .get(&any.type_id())
            .and_then(|entry| (entry.encode)(any))
            .ok_or(SchemaError::UnregisteredType {
                type_name: doc.document_type_name(),
            })
    }

    pub fn contains<T: Document>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.entries.values().map(|e| e.type_name).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("types", &self.type_names())
            .finish()
    }
}
