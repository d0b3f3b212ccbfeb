//! Listener types

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::mapping::Record;
use crate::store::ChangeKind;

/// Published, immutable list of decoded items
pub type ItemList<T> = Arc<[Arc<Record<T>>]>;

/// When change callbacks run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// Invoke handlers while the snapshot is processed
    #[default]
    Immediate,
    /// Queue handlers until `drain()` is called
    Deferred,
}

impl DispatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchMode::Immediate => "immediate",
            DispatchMode::Deferred => "deferred",
        }
    }
}

impl fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Listener lifecycle. Teardown happens by dropping the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Unattached,
    Listening,
}

/// One dispatched change: `old` from the previous snapshot, `new` from the
/// current one
#[derive(Debug)]
pub struct ItemChange<T> {
    pub old: Option<Arc<Record<T>>>,
    pub new: Option<Arc<Record<T>>>,
    pub kind: ChangeKind,
}

impl<T> Clone for ItemChange<T> {
    fn clone(&self) -> Self {
        Self {
            old: self.old.clone(),
            new: self.new.clone(),
            kind: self.kind,
        }
    }
}

/// Queued callback descriptor
#[derive(Debug)]
pub enum PendingEvent<T> {
    Change(ItemChange<T>),
    /// Valid-only view published by the snapshot that queued this event
    ItemsUpdated(ItemList<T>),
}

impl<T> Clone for PendingEvent<T> {
    fn clone(&self) -> Self {
        match self {
            PendingEvent::Change(change) => PendingEvent::Change(change.clone()),
            PendingEvent::ItemsUpdated(items) => PendingEvent::ItemsUpdated(Arc::clone(items)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_mode_serde() {
        let mode: DispatchMode = serde_json::from_str("\"deferred\"").unwrap();
        assert_eq!(mode, DispatchMode::Deferred);
        assert_eq!(DispatchMode::default(), DispatchMode::Immediate);
        assert_eq!(DispatchMode::Deferred.to_string(), "deferred");
    }
}
