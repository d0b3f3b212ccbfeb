//! Decoded documents

use crate::incident::Incident;
use crate::value::DocumentRef;

/// A typed document with its identity and the incidents of its last decode
///
/// Incidents are transient: they are never encoded and are recomputed by
/// every decode.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<T> {
    pub reference: DocumentRef,
    pub data: T,
    pub incidents: Vec<Incident>,
}

impl<T> Record<T> {
    /// Wrap data that was not decoded from the store, with no incidents.
    pub fn new(reference: DocumentRef, data: T) -> Self {
        Self {
            reference,
            data,
            incidents: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        self.reference.id()
    }

    pub fn path(&self) -> &str {
        self.reference.path()
    }

    /// True when the last decode produced no incident.
    pub fn is_valid(&self) -> bool {
        self.incidents.is_empty()
    }
}
