//! Observability events for docsync
//!
//! Lifecycle events emitted by the registry, the mapping context and the
//! snapshot listeners. Events are explicit and typed.

use std::fmt;

/// Observable lifecycle events
///
/// Covers:
/// - Registry and context setup
/// - Snapshot listener lifecycle
/// - Deferred event dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Setup
    /// Schema registry frozen
    RegistryBuilt,
    /// Mapping context ready for use
    ContextInitialized,

    // Listener lifecycle
    /// Listener subscribed to its query
    ListenerAttached,
    /// First snapshot applied, initial fetch complete
    InitialFetchComplete,
    /// Snapshot decoded and published
    SnapshotApplied,
    /// Snapshot rejected by a strict-mode incident
    SnapshotRejected,
    /// Subscription stream ended or failed
    ListenerStopped,

    // Dispatch
    /// Deferred events flushed
    EventsDrained,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::RegistryBuilt => "REGISTRY_BUILT",
            Event::ContextInitialized => "CONTEXT_INITIALIZED",

            Event::ListenerAttached => "LISTENER_ATTACHED",
            Event::InitialFetchComplete => "INITIAL_FETCH_COMPLETE",
            Event::SnapshotApplied => "SNAPSHOT_APPLIED",
            Event::SnapshotRejected => "SNAPSHOT_REJECTED",
            Event::ListenerStopped => "LISTENER_STOPPED",

            Event::EventsDrained => "EVENTS_DRAINED",
        }
    }

    /// Returns true if this event reports a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::SnapshotRejected)
    }

    /// Per-snapshot events, logged at debug level
    pub fn is_verbose(&self) -> bool {
        matches!(self, Event::SnapshotApplied | Event::EventsDrained)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
