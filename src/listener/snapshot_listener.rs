//! # Snapshot Listener
//!
//! Keeps the decoded result of one live query in memory. Each snapshot is
//! decoded in full, diffed positionally against the previous one, and
//! published as two fresh immutable lists: every item, and the valid-only
//! subsequence. Readers always see a complete list.
//!
//! Changes are dispatched only when the new item is absent (a removal) or
//! decoded without incidents.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use futures_util::StreamExt;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::warn;
use uuid::Uuid;

use super::errors::ListenerError;
use super::queue::EventQueue;
use super::types::{DispatchMode, ItemChange, ItemList, ListenerState, PendingEvent};
use crate::mapping::{MappingContext, MappingError, MappingResult, Record};
use crate::observability::{log_event_with_fields, Event};
use crate::schema::Document;
use crate::store::{DocumentStore, RawSnapshot, SnapshotStream};

type ChangeHandler<T> = Arc<dyn Fn(&ItemChange<T>) + Send + Sync>;
type ItemsHandler<T> = Arc<dyn Fn(&ItemList<T>) + Send + Sync>;
type InitialSignal = oneshot::Sender<MappingResult<()>>;

struct Views<T> {
    all: ItemList<T>,
    valid: ItemList<T>,
}

/// State shared between the listener handle and its pump task
struct Shared<T> {
    id: Uuid,
    context: Arc<MappingContext>,
    views: RwLock<Views<T>>,
    queue: EventQueue<T>,
    change_handlers: RwLock<Vec<ChangeHandler<T>>>,
    items_handlers: RwLock<Vec<ItemsHandler<T>>>,
    /// Serializes snapshot processing
    serial: Mutex<()>,
    state: Mutex<ListenerState>,
    initial: Mutex<Option<InitialSignal>>,
}

impl<T: Document> Shared<T> {
    fn process(&self, snapshot: RawSnapshot) -> MappingResult<()> {
        let serial = self.serial.lock().unwrap_or_else(PoisonError::into_inner);

        let previous = self.all_items();

        let decoded = snapshot
            .documents
            .into_iter()
            .map(|doc| {
                self.context
                    .decode::<T>(doc.reference, doc.fields)
                    .map(Arc::new)
            })
            .collect::<MappingResult<Vec<_>>>()?;
        let all: ItemList<T> = decoded.into();

        let mut batch = Vec::with_capacity(snapshot.changes.len() + 1);
        for change in &snapshot.changes {
            let old = self.resolve(&previous, change.old_index, "old");
            let new = self.resolve(&all, change.new_index, "new");

            let eligible = new.as_ref().map_or(true, |record| record.is_valid());
            if eligible {
                batch.push(PendingEvent::Change(ItemChange {
                    old,
                    new,
                    kind: change.kind,
                }));
            }
        }

        let valid: ItemList<T> = all
            .iter()
            .filter(|record| record.is_valid())
            .cloned()
            .collect();

        {
            let mut views = self.views.write().unwrap_or_else(PoisonError::into_inner);
            views.all = Arc::clone(&all);
            views.valid = Arc::clone(&valid);
        }

        let changes = batch.len().to_string();
        batch.push(PendingEvent::ItemsUpdated(Arc::clone(&valid)));

        let ready = self.queue.submit(batch);
        // Views are published and the batch is queued; handlers may re-enter
        drop(serial);

        if let Some(ready) = ready {
            self.dispatch(ready);
        }

        let id = self.id.to_string();
        let total = all.len().to_string();
        let valid_count = valid.len().to_string();
        log_event_with_fields(
            Event::SnapshotApplied,
            &[
                ("listener", &id),
                ("items", &total),
                ("valid", &valid_count),
                ("changes", &changes),
            ],
        );

        if let Some(signal) = self.take_initial() {
            log_event_with_fields(Event::InitialFetchComplete, &[("listener", &id)]);
            let _ = signal.send(Ok(()));
        }

        Ok(())
    }

    /// Out-of-range indices resolve to absent.
    fn resolve(
        &self,
        list: &ItemList<T>,
        index: Option<usize>,
        side: &'static str,
    ) -> Option<Arc<Record<T>>> {
        let index = index?;
        let found = list.get(index).cloned();
        if found.is_none() {
            warn!(
                listener = %self.id,
                side,
                index,
                len = list.len(),
                "Change index out of range"
            );
        }
        found
    }

    fn dispatch(&self, events: Vec<PendingEvent<T>>) {
        let change_handlers = self
            .change_handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let items_handlers = self
            .items_handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        for event in events {
            match event {
                PendingEvent::Change(change) => {
                    for handler in &change_handlers {
                        handler(&change);
                    }
                }
                PendingEvent::ItemsUpdated(items) => {
                    for handler in &items_handlers {
                        handler(&items);
                    }
                }
            }
        }
    }

    fn all_items(&self) -> ItemList<T> {
        Arc::clone(&self.views.read().unwrap_or_else(PoisonError::into_inner).all)
    }

    fn valid_items(&self) -> ItemList<T> {
        Arc::clone(&self.views.read().unwrap_or_else(PoisonError::into_inner).valid)
    }

    fn take_initial(&self) -> Option<InitialSignal> {
        self.initial
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Resolve a pending initial fetch with an error.
    fn fail_initial(&self, err: MappingError) {
        if let Some(signal) = self.take_initial() {
            let _ = signal.send(Err(err));
        }
    }

    async fn pump(self: Arc<Self>, mut stream: SnapshotStream) {
        let id = self.id.to_string();

        while let Some(next) = stream.next().await {
            let result = next
                .map_err(MappingError::from)
                .and_then(|snapshot| self.process(snapshot));

            if let Err(err) = result {
                log_event_with_fields(
                    Event::SnapshotRejected,
                    &[("listener", &id), ("code", err.code())],
                );
                warn!(listener = %id, error = %err, "Snapshot rejected, listener stopped");
                self.fail_initial(err);
                return;
            }
        }

        log_event_with_fields(Event::ListenerStopped, &[("listener", &id)]);
        self.fail_initial(ListenerError::StreamEnded.into());
    }
}

/// Live, decoded view of one query
pub struct SnapshotListener<T, S: DocumentStore> {
    query: S::Query,
    store: Arc<S>,
    shared: Arc<Shared<T>>,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Document, S: DocumentStore> SnapshotListener<T, S> {
    pub fn new(context: Arc<MappingContext>, store: Arc<S>, query: S::Query) -> Self {
        let empty: ItemList<T> = Vec::new().into();
        let mode = context.config().default_dispatch;

        Self {
            query,
            store,
            shared: Arc::new(Shared {
                id: Uuid::new_v4(),
                context,
                views: RwLock::new(Views {
                    all: Arc::clone(&empty),
                    valid: empty,
                }),
                queue: EventQueue::new(mode),
                change_handlers: RwLock::new(Vec::new()),
                items_handlers: RwLock::new(Vec::new()),
                serial: Mutex::new(()),
                state: Mutex::new(ListenerState::Unattached),
                initial: Mutex::new(None),
            }),
            pump: Mutex::new(None),
        }
    }

    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    pub fn query(&self) -> &S::Query {
        &self.query
    }

    pub fn state(&self) -> ListenerState {
        *self
            .shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn mode(&self) -> DispatchMode {
        self.shared.queue.mode()
    }

    /// Number of queued, undispatched events
    pub fn pending_len(&self) -> usize {
        self.shared.queue.len()
    }

    /// Register a handler for each dispatched item change.
    ///
    /// Handlers run on the task that processed the snapshot, after its views
    /// are published. They may call back into the listener.
    pub fn on_item_change<F>(&self, handler: F)
    where
        F: Fn(&ItemChange<T>) + Send + Sync + 'static,
    {
        self.shared
            .change_handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(handler));
    }

    /// Register a handler receiving the valid-only view after each snapshot.
    ///
    /// Runs on the processing task like [`Self::on_item_change`].
    pub fn on_items_updated<F>(&self, handler: F)
    where
        F: Fn(&ItemList<T>) + Send + Sync + 'static,
    {
        self.shared
            .items_handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(handler));
    }

    /// Subscribe with the configured default dispatch mode.
    pub async fn listen(&self) -> MappingResult<()> {
        let mode = self.shared.context.config().default_dispatch;
        self.fetch_and_listen(mode).await
    }

    /// Subscribe to the query and wait until the first snapshot is applied.
    ///
    /// There is no timeout: if the store never delivers, this never returns.
    ///
    /// # Errors
    ///
    /// - `AlreadyListening` on a second call
    /// - the store's error if subscribing fails
    /// - the first snapshot's decode error in strict mode
    /// - `StreamEnded` if the stream closes before any snapshot
    pub async fn fetch_and_listen(&self, mode: DispatchMode) -> MappingResult<()> {
        let initial = {
            let mut state = self
                .shared
                .state
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if *state == ListenerState::Listening {
                return Err(ListenerError::AlreadyListening.into());
            }
            *state = ListenerState::Listening;

            self.shared.queue.set_mode(mode);
            let (tx, rx) = oneshot::channel();
            *self
                .shared
                .initial
                .lock()
                .unwrap_or_else(PoisonError::into_inner) = Some(tx);
            rx
        };

        let stream = match self.store.subscribe(&self.query).await {
            Ok(stream) => stream,
            Err(err) => {
                self.shared.take_initial();
                *self
                    .shared
                    .state
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = ListenerState::Unattached;
                return Err(err.into());
            }
        };

        let id = self.shared.id.to_string();
        log_event_with_fields(
            Event::ListenerAttached,
            &[("listener", &id), ("dispatch", mode.as_str())],
        );

        let handle = tokio::spawn(Arc::clone(&self.shared).pump(stream));
        *self.pump.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);

        initial
            .await
            .unwrap_or_else(|_| Err(ListenerError::StreamEnded.into()))
    }

    /// Apply one snapshot: decode, diff, publish, then dispatch or queue.
    ///
    /// # Errors
    ///
    /// In strict mode a decode incident rejects the whole snapshot; the
    /// published views and the queue are left as they were.
    pub fn process_snapshot(&self, snapshot: RawSnapshot) -> MappingResult<()> {
        self.shared.process(snapshot)
    }

    /// Invoke every queued event in order and switch to immediate mode.
    pub fn drain(&self) {
        let drained = self.shared.queue.drain();
        let count = drained.len().to_string();
        self.shared.dispatch(drained);

        let id = self.shared.id.to_string();
        log_event_with_fields(Event::EventsDrained, &[("listener", &id), ("events", &count)]);
    }

    /// Valid-only view, in query order
    pub fn items(&self) -> ItemList<T> {
        self.shared.valid_items()
    }

    /// Every decoded item, incidents included
    pub fn all_items(&self) -> ItemList<T> {
        self.shared.all_items()
    }

    /// Items whose last decode produced incidents
    pub fn items_with_incidents(&self) -> Vec<Arc<Record<T>>> {
        self.shared
            .all_items()
            .iter()
            .filter(|record| !record.is_valid())
            .cloned()
            .collect()
    }

    /// Look up a valid item by document id.
    pub fn get_by_id(&self, id: &str) -> Option<Arc<Record<T>>> {
        self.shared
            .valid_items()
            .iter()
            .find(|record| record.id() == id)
            .cloned()
    }
}

impl<T, S: DocumentStore> Drop for SnapshotListener<T, S> {
    fn drop(&mut self) {
        if let Some(handle) = self.pump.lock().unwrap_or_else(PoisonError::into_inner).take() {
            handle.abort();
        }
    }
}

impl<T, S: DocumentStore> fmt::Debug for SnapshotListener<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotListener")
            .field("id", &self.shared.id)
            .field("query", &self.query)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MappingConfig;
    use crate::schema::{FieldDef, SchemaRegistry};
    use crate::store::{ChangeKind, CollectionQuery, DocumentChange, MemoryStore, RawDocument};
    use crate::value::{DocumentRef, Value, ValueMap};

    #[derive(Debug, Default)]
    struct Task {
        title: String,
    }

    impl Document for Task {
        fn fields() -> Vec<FieldDef<Self>> {
            vec![FieldDef::required("title", |t: &Task| &t.title, |t: &mut Task| &mut t.title)]
        }
    }

    fn listener(config: MappingConfig) -> SnapshotListener<Task, MemoryStore> {
        let mut builder = SchemaRegistry::builder();
        builder.register::<Task>().unwrap();
        let context = Arc::new(MappingContext::new(builder.build(), config));
        SnapshotListener::new(
            context,
            Arc::new(MemoryStore::new()),
            CollectionQuery::new("tasks"),
        )
    }

    fn doc(id: &str, title: Option<&str>) -> RawDocument {
        let mut fields = ValueMap::new();
        if let Some(title) = title {
            fields.insert("title".into(), Value::from(title));
        }
        RawDocument::new(DocumentRef::new("tasks", id).unwrap(), fields)
    }

    #[test]
    fn test_initial_views() {
        let listener = listener(MappingConfig::lenient());
        listener
            .process_snapshot(RawSnapshot::initial(vec![
                doc("1", Some("a")),
                doc("2", None),
            ]))
            .unwrap();

        assert_eq!(listener.all_items().len(), 2);
        assert_eq!(listener.items().len(), 1);
        assert_eq!(listener.items_with_incidents()[0].id(), "2");
        assert!(listener.get_by_id("1").is_some());
        assert!(listener.get_by_id("2").is_none());
    }

    #[test]
    fn test_changes_for_invalid_items_suppressed() {
        let listener = listener(MappingConfig::lenient());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        listener.on_item_change(move |change| {
            sink.lock().unwrap().push(change.kind);
        });

        listener
            .process_snapshot(RawSnapshot::initial(vec![
                doc("1", Some("a")),
                doc("2", None),
            ]))
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![ChangeKind::Added]);
    }

    #[test]
    fn test_out_of_range_index_resolves_absent() {
        let listener = listener(MappingConfig::strict());
        let changes = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&changes);
        listener.on_item_change(move |change| {
            sink.lock()
                .unwrap()
                .push((change.old.is_some(), change.new.is_some()));
        });

        listener
            .process_snapshot(RawSnapshot {
                documents: vec![doc("1", Some("a"))],
                changes: vec![DocumentChange::removed(5)],
            })
            .unwrap();

        assert_eq!(*changes.lock().unwrap(), vec![(false, false)]);
    }

    #[test]
    fn test_strict_rejects_whole_snapshot() {
        let listener = listener(MappingConfig::strict());
        listener
            .process_snapshot(RawSnapshot::initial(vec![doc("1", Some("a"))]))
            .unwrap();

        let err = listener
            .process_snapshot(RawSnapshot {
                documents: vec![doc("1", Some("a")), doc("2", None)],
                changes: vec![DocumentChange::added(1)],
            })
            .unwrap_err();

        assert_eq!(err.code(), "DOCSYNC_MISSING_FIELD");
        assert_eq!(listener.all_items().len(), 1);
        assert_eq!(listener.pending_len(), 0);
    }

    #[test]
    fn test_published_lists_are_replaced_not_mutated() {
        let listener = listener(MappingConfig::strict());
        listener
            .process_snapshot(RawSnapshot::initial(vec![doc("1", Some("a"))]))
            .unwrap();
        let before = listener.items();

        listener
            .process_snapshot(RawSnapshot {
                documents: vec![doc("1", Some("a")), doc("2", Some("b"))],
                changes: vec![DocumentChange::added(1)],
            })
            .unwrap();

        assert_eq!(before.len(), 1);
        assert_eq!(listener.items().len(), 2);
    }

    #[test]
    fn test_handler_can_reenter_process_snapshot() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::time::Duration;

        let listener = Arc::new(listener(MappingConfig::strict()));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        let weak = Arc::downgrade(&listener);
        let reentered = AtomicBool::new(false);
        listener.on_items_updated(move |items| {
            sink.lock().unwrap().push(items.len());
            if reentered.swap(true, Ordering::SeqCst) {
                return;
            }
            if let Some(listener) = weak.upgrade() {
                listener
                    .process_snapshot(RawSnapshot {
                        documents: vec![doc("1", Some("a")), doc("2", Some("b"))],
                        changes: vec![DocumentChange::added(1)],
                    })
                    .unwrap();
            }
        });

        let (done_tx, done_rx) = std::sync::mpsc::channel();
        let worker = Arc::clone(&listener);
        std::thread::spawn(move || {
            let result = worker.process_snapshot(RawSnapshot::initial(vec![doc("1", Some("a"))]));
            let _ = done_tx.send(result.is_ok());
        });

        assert_eq!(done_rx.recv_timeout(Duration::from_secs(5)), Ok(true));
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
        assert_eq!(listener.items().len(), 2);
    }

    #[tokio::test]
    async fn test_second_fetch_and_listen_rejected() {
        let listener = listener(MappingConfig::strict());
        listener.fetch_and_listen(DispatchMode::Immediate).await.unwrap();
        assert_eq!(listener.state(), ListenerState::Listening);

        let err = listener
            .fetch_and_listen(DispatchMode::Immediate)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MappingError::Listener(ListenerError::AlreadyListening)
        ));
    }

    #[tokio::test]
    async fn test_listen_uses_configured_dispatch() {
        let listener = listener(MappingConfig::strict().with_default_dispatch(DispatchMode::Deferred));
        listener.listen().await.unwrap();
        assert_eq!(listener.mode(), DispatchMode::Deferred);
        assert_eq!(listener.pending_len(), 1);

        listener.drain();
        assert_eq!(listener.mode(), DispatchMode::Immediate);
        assert_eq!(listener.pending_len(), 0);
    }
}
