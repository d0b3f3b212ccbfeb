//! Schema registry for typed document mapping
//!
//! Each document type declares its persisted fields once through
//! [`Document::fields`]. The registry turns those declarations into a
//! [`CollectionDefinition`] per type: an ordered field table with typed
//! get/set accessors and a compiled encoder. Definitions are built in a single
//! pass at startup and never change afterwards.
//!
//! # Design Principles
//!
//! - Registration happens once, before any concurrent mapping
//! - Lookups are by `TypeId`, lock-free after construction
//! - Field names are unique per document type
//! - Unregistered types are configuration errors, never retried

mod definition;
mod document;
mod errors;
mod field;
mod registry;
mod slot;
mod types;

pub use definition::CollectionDefinition;
pub use document::{short_type_name, AnyDocument, Document, UntypedDocument};
pub use errors::{SchemaError, SchemaResult};
pub use field::FieldDef;
pub use registry::{SchemaRegistry, SchemaRegistryBuilder};
pub use slot::Slot;
pub use types::{ElementShape, Nullability, Shape};
