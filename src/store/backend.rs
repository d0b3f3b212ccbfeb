//! # Document Store Trait
//!
//! The upstream driver. Queries are opaque to the mapping layer and passed
//! through unchanged.

use std::fmt::Debug;

use async_trait::async_trait;
use futures_util::stream::BoxStream;

use super::errors::StoreResult;
use super::types::{RawDocument, RawSnapshot};
use crate::value::{DocumentRef, ValueMap};

/// Live stream of query snapshots
pub type SnapshotStream = BoxStream<'static, StoreResult<RawSnapshot>>;

/// Driver for a schemaless document store
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Opaque query handle
    type Query: Clone + Debug + Send + Sync + 'static;

    /// Fetch one document; `None` if it does not exist
    async fn get(&self, reference: &DocumentRef) -> StoreResult<Option<ValueMap>>;

    /// Run a query once, in store order
    async fn run_query(&self, query: &Self::Query) -> StoreResult<Vec<RawDocument>>;

    /// Subscribe to a query. The first item is the full current result.
    async fn subscribe(&self, query: &Self::Query) -> StoreResult<SnapshotStream>;

    /// Create a document that must not exist yet
    async fn create(&self, reference: &DocumentRef, fields: ValueMap) -> StoreResult<()>;

    /// Create or overlay top-level fields of a document
    async fn merge(&self, reference: &DocumentRef, fields: ValueMap) -> StoreResult<()>;

    /// Delete a document
    async fn delete(&self, reference: &DocumentRef) -> StoreResult<()>;

    /// Check if a query matches anything
    ///
    /// The default runs the full query. Drivers should override it and cap
    /// the query at one result.
    async fn exists(&self, query: &Self::Query) -> StoreResult<bool> {
        Ok(!self.run_query(query).await?.is_empty())
    }
}
