//! Observability subsystem for docsync
//!
//! Lifecycle events are typed ([`Event`]) and emitted through `tracing`, so
//! the embedding application decides where they go by installing its own
//! subscriber. The library never installs one.
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on mapping or dispatch
//! 3. One event = one log record, fields in deterministic order
//!
//! # Usage
//!
//! ```ignore
//! use docsync::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::SnapshotApplied, &[("items", "42")]);
//! ```

mod events;

pub use events::Event;

use std::fmt;

use tracing::{debug, info, warn};

/// Fields rendered as `key=value` pairs sorted by key
struct SortedFields<'a>(&'a [(&'a str, &'a str)]);

impl fmt::Display for SortedFields<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sorted: Vec<_> = self.0.iter().collect();
        sorted.sort_by_key(|(k, _)| *k);

        for (i, (key, value)) in sorted.into_iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}

/// Log a lifecycle event
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let fields = SortedFields(fields);
    if event.is_failure() {
        warn!(event = event.as_str(), "{}", fields);
    } else if event.is_verbose() {
        debug!(event = event.as_str(), "{}", fields);
    } else {
        info!(event = event.as_str(), "{}", fields);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_sorted_by_key() {
        let fields = [("zebra", "1"), ("apple", "2"), ("mango", "3")];
        assert_eq!(
            SortedFields(&fields).to_string(),
            "apple=2 mango=3 zebra=1"
        );
    }

    #[test]
    fn test_field_order_is_deterministic() {
        let a = [("b", "2"), ("a", "1")];
        let b = [("a", "1"), ("b", "2")];
        assert_eq!(SortedFields(&a).to_string(), SortedFields(&b).to_string());
    }

    #[test]
    fn test_log_event() {
        // This just verifies no panic without a subscriber
        log_event(Event::RegistryBuilt);
        log_event_with_fields(Event::SnapshotRejected, &[("listener", "l1")]);
    }
}
