//! In-memory document store
//!
//! Reference [`DocumentStore`] used by tests and embedding applications.
//! Documents are grouped by collection path and kept ordered by id. Every
//! mutation recomputes the result of each live subscription on the touched
//! collection and pushes a snapshot carrying the positional diff.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use tokio::sync::mpsc;
use tracing::debug;

use super::backend::{DocumentStore, SnapshotStream};
use super::errors::{StoreError, StoreResult};
use super::types::{DocumentChange, RawDocument, RawSnapshot};
use crate::value::{DocumentRef, ValueMap};

/// All documents of one collection, optionally capped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionQuery {
    pub collection: String,
    pub limit: Option<usize>,
}

impl CollectionQuery {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            limit: None,
        }
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

struct Watcher {
    query: CollectionQuery,
    last: Vec<RawDocument>,
    tx: mpsc::UnboundedSender<StoreResult<RawSnapshot>>,
}

#[derive(Default)]
struct MemoryState {
    /// collection path -> id -> (reference, fields)
    collections: BTreeMap<String, BTreeMap<String, (DocumentRef, ValueMap)>>,
    watchers: Vec<Watcher>,
    closed: bool,
}

impl MemoryState {
    fn run(&self, query: &CollectionQuery) -> Vec<RawDocument> {
        let Some(docs) = self.collections.get(&query.collection) else {
            return Vec::new();
        };
        let limit = query.limit.unwrap_or(usize::MAX);
        docs.values()
            .take(limit)
            .map(|(reference, fields)| RawDocument::new(reference.clone(), fields.clone()))
            .collect()
    }

    fn notify(&mut self, collection: &str) {
        let mut watchers = std::mem::take(&mut self.watchers);
        watchers.retain_mut(|watcher| {
            if watcher.query.collection != collection {
                return !watcher.tx.is_closed();
            }

            let documents = self.run(&watcher.query);
            let changes = diff(&watcher.last, &documents);
            if changes.is_empty() {
                return !watcher.tx.is_closed();
            }

            watcher.last = documents.clone();
            watcher
                .tx
                .send(Ok(RawSnapshot { documents, changes }))
                .is_ok()
        });
        self.watchers = watchers;
    }
}

/// Positional diff between two ordered results: removals in old order, then
/// additions and modifications in new order.
fn diff(old: &[RawDocument], new: &[RawDocument]) -> Vec<DocumentChange> {
    let position = |docs: &[RawDocument], reference: &DocumentRef| {
        docs.iter().position(|d| &d.reference == reference)
    };

    let mut changes: Vec<DocumentChange> = old
        .iter()
        .enumerate()
        .filter(|(_, doc)| position(new, &doc.reference).is_none())
        .map(|(i, _)| DocumentChange::removed(i))
        .collect();

    for (j, doc) in new.iter().enumerate() {
        match position(old, &doc.reference) {
            None => changes.push(DocumentChange::added(j)),
            Some(i) if old[i].fields != doc.fields => changes.push(DocumentChange::modified(i, j)),
            Some(_) => {}
        }
    }
    changes
}

/// In-process store
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, MemoryState>> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.closed {
            return Err(StoreError::Closed);
        }
        Ok(state)
    }

    /// Close the store. Live subscriptions end and later calls fail.
    pub fn close(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.closed = true;
        state.watchers.clear();
    }

    /// Number of live subscriptions
    pub fn subscription_count(&self) -> usize {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.watchers.iter().filter(|w| !w.tx.is_closed()).count()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    type Query = CollectionQuery;

    async fn get(&self, reference: &DocumentRef) -> StoreResult<Option<ValueMap>> {
        let state = self.lock()?;
        Ok(state
            .collections
            .get(reference.collection_path())
            .and_then(|docs| docs.get(reference.id()))
            .map(|(_, fields)| fields.clone()))
    }

    async fn run_query(&self, query: &CollectionQuery) -> StoreResult<Vec<RawDocument>> {
        Ok(self.lock()?.run(query))
    }

    async fn exists(&self, query: &CollectionQuery) -> StoreResult<bool> {
        let capped = CollectionQuery {
            limit: Some(query.limit.map_or(1, |limit| limit.min(1))),
            ..query.clone()
        };
        Ok(!self.lock()?.run(&capped).is_empty())
    }

    async fn subscribe(&self, query: &CollectionQuery) -> StoreResult<SnapshotStream> {
        let mut state = self.lock()?;
        let (tx, rx) = mpsc::unbounded_channel();

        let documents = state.run(query);
        // Receiver is alive here, the send cannot fail
        let _ = tx.send(Ok(RawSnapshot::initial(documents.clone())));

        state.watchers.push(Watcher {
            query: query.clone(),
            last: documents,
            tx,
        });
        debug!(collection = %query.collection, "Subscription opened");

        let stream = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        });
        Ok(stream.boxed())
    }

    async fn create(&self, reference: &DocumentRef, fields: ValueMap) -> StoreResult<()> {
        let mut state = self.lock()?;
        let docs = state
            .collections
            .entry(reference.collection_path().to_string())
            .or_default();
        if docs.contains_key(reference.id()) {
            return Err(StoreError::AlreadyExists(reference.path().to_string()));
        }
        docs.insert(reference.id().to_string(), (reference.clone(), fields));
        state.notify(reference.collection_path());
        Ok(())
    }

    async fn merge(&self, reference: &DocumentRef, fields: ValueMap) -> StoreResult<()> {
        let mut state = self.lock()?;
        let (_, existing) = state
            .collections
            .entry(reference.collection_path().to_string())
            .or_default()
            .entry(reference.id().to_string())
            .or_insert_with(|| (reference.clone(), ValueMap::new()));
        existing.extend(fields);
        state.notify(reference.collection_path());
        Ok(())
    }

    async fn delete(&self, reference: &DocumentRef) -> StoreResult<()> {
        let mut state = self.lock()?;
        let removed = state
            .collections
            .get_mut(reference.collection_path())
            .and_then(|docs| docs.remove(reference.id()))
            .is_some();
        if removed {
            state.notify(reference.collection_path());
        }
        Ok(())
    }
}
