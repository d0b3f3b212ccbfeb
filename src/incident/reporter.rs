//! # Incident Reporter
//!
//! Policy point for decode incidents. In lenient mode every declared
//! incident is delivered exactly once to each live subscriber over an
//! unbounded channel; closed subscribers are dropped on the next delivery.

use std::sync::{PoisonError, RwLock};

use tokio::sync::mpsc;
use tracing::warn;

use super::behavior::MappingBehavior;
use super::types::Incident;
use crate::mapping::{MappingError, MappingResult};

/// Incident sender for one subscriber
type IncidentSender = mpsc::UnboundedSender<Incident>;

/// Incident receiver handed to subscribers
pub type IncidentReceiver = mpsc::UnboundedReceiver<Incident>;

/// Applies the global mapping behavior to declared incidents
#[derive(Debug)]
pub struct IncidentReporter {
    behavior: MappingBehavior,
    subscribers: RwLock<Vec<IncidentSender>>,
}

impl Default for IncidentReporter {
    fn default() -> Self {
        Self::new(MappingBehavior::default())
    }
}

impl IncidentReporter {
    pub fn new(behavior: MappingBehavior) -> Self {
        Self {
            behavior,
            subscribers: RwLock::new(Vec::new()),
        }
    }

    pub fn behavior(&self) -> MappingBehavior {
        self.behavior
    }

    /// Subscribe to lenient-mode incidents.
    ///
    /// Strict mode never delivers anything: the incident is returned as an
    /// error to the caller instead.
    pub fn subscribe(&self) -> IncidentReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// Number of subscribers whose receiver is still alive
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|tx| !tx.is_closed())
            .count()
    }

    /// Declare one incident.
    ///
    /// # Errors
    ///
    /// In strict mode, always returns `MappingError::Incident` carrying the
    /// incident. Lenient mode never fails.
    pub fn declare(&self, incident: Incident) -> MappingResult<()> {
        if self.behavior.is_strict() {
            return Err(MappingError::Incident(incident));
        }

        warn!(
            kind = %incident.kind(),
            document = %incident.document(),
            field = incident.field(),
            "{}",
            incident.message()
        );

        let mut subscribers = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|tx| tx.send(incident.clone()).is_ok());

        Ok(())
    }

    /// Declare incidents in order, stopping at the first error.
    pub fn declare_all(&self, incidents: &[Incident]) -> MappingResult<()> {
        for incident in incidents {
            self.declare(incident.clone())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::DocumentRef;

    fn incident(field: &str) -> Incident {
        Incident::missing_field(DocumentRef::new("users", "u1").unwrap(), "User", field)
    }

    #[test]
    fn test_strict_raises_first_incident() {
        let reporter = IncidentReporter::new(MappingBehavior::Strict);
        let mut rx = reporter.subscribe();

        let err = reporter
            .declare_all(&[incident("a"), incident("b")])
            .unwrap_err();
        match err {
            MappingError::Incident(raised) => assert_eq!(raised.field(), "a"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_lenient_broadcasts_to_every_subscriber_once() {
        let reporter = IncidentReporter::new(MappingBehavior::Lenient);
        let mut rx1 = reporter.subscribe();
        let mut rx2 = reporter.subscribe();

        reporter.declare_all(&[incident("a"), incident("b")]).unwrap();

        for rx in [&mut rx1, &mut rx2] {
            assert_eq!(rx.try_recv().unwrap().field(), "a");
            assert_eq!(rx.try_recv().unwrap().field(), "b");
            assert!(rx.try_recv().is_err());
        }
    }

    #[test]
    fn test_closed_subscribers_pruned() {
        let reporter = IncidentReporter::new(MappingBehavior::Lenient);
        let rx = reporter.subscribe();
        let _kept = reporter.subscribe();
        assert_eq!(reporter.subscriber_count(), 2);

        drop(rx);
        assert_eq!(reporter.subscriber_count(), 1);

        reporter.declare(incident("a")).unwrap();
        assert_eq!(reporter.subscribers.read().unwrap().len(), 1);
    }

    #[test]
    fn test_lenient_without_subscribers_is_ok() {
        let reporter = IncidentReporter::new(MappingBehavior::Lenient);
        assert!(reporter.declare(incident("a")).is_ok());
    }
}
