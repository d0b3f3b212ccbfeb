//! docsync - typed document mapping and live query snapshots
//!
//! Maps plain Rust structs to and from schemaless documents, reporting every
//! data-shape defect as an incident, and keeps the decoded result of a live
//! query in memory.
//!
//! ```ignore
//! let mut builder = SchemaRegistry::builder();
//! builder.register::<User>()?;
//! let context = Arc::new(MappingContext::new(builder.build(), MappingConfig::lenient()));
//!
//! let listener = SnapshotListener::<User, _>::new(context, store, query);
//! listener.fetch_and_listen(DispatchMode::Immediate).await?;
//! ```

pub mod config;
pub mod incident;
pub mod listener;
pub mod mapping;
pub mod observability;
pub mod schema;
pub mod store;
pub mod value;

pub use config::MappingConfig;
pub use incident::{Incident, IncidentKind, MappingBehavior};
pub use listener::{DispatchMode, ItemChange, SnapshotListener};
pub use mapping::{MappingContext, MappingError, MappingResult, Record};
pub use schema::{Document, FieldDef, SchemaRegistry};
pub use store::{DocumentStore, MemoryStore};
pub use value::{DocumentRef, Timestamp, Value, ValueMap};
