//! Document store collaborators
//!
//! The mapping layer talks to the store only through [`DocumentStore`]:
//! point reads, one-shot queries, live subscriptions and writes, all in terms
//! of raw [`ValueMap`](crate::value::ValueMap)s. [`MemoryStore`] is the
//! in-process implementation.

mod backend;
mod errors;
mod memory;
mod types;

pub use backend::{DocumentStore, SnapshotStream};
pub use errors::{StoreError, StoreResult};
pub use memory::{CollectionQuery, MemoryStore};
pub use types::{ChangeKind, DocumentChange, RawDocument, RawSnapshot};
