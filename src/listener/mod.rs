//! Live snapshot listener
//!
//! A [`SnapshotListener`] subscribes to one query and keeps its decoded
//! result in memory. Per snapshot it:
//!
//! 1. Decodes every document through the mapping context
//! 2. Resolves each positional change against the previous and new lists
//! 3. Publishes fresh full and valid-only lists
//! 4. Dispatches change and items-updated events, or queues them while in
//!    deferred mode until [`SnapshotListener::drain`]
//!
//! Snapshots of one listener are processed one at a time. Handlers run on
//! the listener's pump task, not on the caller's.

mod errors;
mod queue;
mod snapshot_listener;
mod types;

pub use errors::{ListenerError, ListenerResult};
pub use snapshot_listener::SnapshotListener;
pub use types::{DispatchMode, ItemChange, ItemList, ListenerState, PendingEvent};
