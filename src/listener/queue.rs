//! Deferred event queue
//!
//! Holds the dispatch mode and the pending callback descriptors under one
//! lock. A snapshot either enqueues its whole batch or gets it back for
//! immediate dispatch; `drain()` takes the queue and switches to immediate
//! mode in the same critical section, so no entry is lost or fired twice.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use super::types::{DispatchMode, PendingEvent};

struct QueueState<T> {
    mode: DispatchMode,
    pending: VecDeque<PendingEvent<T>>,
}

pub(crate) struct EventQueue<T> {
    state: Mutex<QueueState<T>>,
}

impl<T> EventQueue<T> {
    pub(crate) fn new(mode: DispatchMode) -> Self {
        Self {
            state: Mutex::new(QueueState {
                mode,
                pending: VecDeque::new(),
            }),
        }
    }

    pub(crate) fn mode(&self) -> DispatchMode {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .mode
    }

    pub(crate) fn set_mode(&self, mode: DispatchMode) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .mode = mode;
    }

    pub(crate) fn len(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pending
            .len()
    }

    /// Queue a snapshot's batch in deferred mode. In immediate mode the batch
    /// is handed back for the caller to invoke.
    pub(crate) fn submit(&self, batch: Vec<PendingEvent<T>>) -> Option<Vec<PendingEvent<T>>> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match state.mode {
            DispatchMode::Immediate => Some(batch),
            DispatchMode::Deferred => {
                state.pending.extend(batch);
                None
            }
        }
    }

    /// Take every queued entry and switch to immediate mode.
    pub(crate) fn drain(&self) -> Vec<PendingEvent<T>> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.mode = DispatchMode::Immediate;
        state.pending.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener::ItemList;
    use crate::mapping::Record;
    use std::sync::Arc;

    fn batch(size: usize) -> Vec<PendingEvent<usize>> {
        let items: Vec<Arc<Record<usize>>> = Vec::new();
        let list: ItemList<usize> = items.into();
        (0..size)
            .map(|_| PendingEvent::ItemsUpdated(Arc::clone(&list)))
            .collect()
    }

    #[test]
    fn test_immediate_hands_batch_back() {
        let queue = EventQueue::new(DispatchMode::Immediate);
        let ready = queue.submit(batch(2)).unwrap();
        assert_eq!(ready.len(), 2);
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn test_deferred_accumulates_until_drain() {
        let queue = EventQueue::new(DispatchMode::Deferred);
        assert!(queue.submit(batch(2)).is_none());
        assert!(queue.submit(batch(1)).is_none());
        assert_eq!(queue.len(), 3);

        let drained = queue.drain();
        assert_eq!(drained.len(), 3);
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.mode(), DispatchMode::Immediate);

        // After drain, batches come straight back
        assert!(queue.submit(batch(1)).is_some());
        assert!(queue.drain().is_empty());
    }
}
