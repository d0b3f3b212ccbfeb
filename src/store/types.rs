//! Raw store payloads

use std::fmt;

use crate::value::{DocumentRef, ValueMap};

/// One stored document as delivered by the driver
#[derive(Debug, Clone, PartialEq)]
pub struct RawDocument {
    pub reference: DocumentRef,
    pub fields: ValueMap,
}

impl RawDocument {
    pub fn new(reference: DocumentRef, fields: ValueMap) -> Self {
        Self { reference, fields }
    }
}

/// Kind of a positional change between two snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Added => "added",
            ChangeKind::Modified => "modified",
            ChangeKind::Removed => "removed",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Positional diff entry
///
/// `old_index` points into the previous snapshot's documents, `new_index`
/// into the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentChange {
    pub kind: ChangeKind,
    pub old_index: Option<usize>,
    pub new_index: Option<usize>,
}

impl DocumentChange {
    pub fn added(new_index: usize) -> Self {
        Self {
            kind: ChangeKind::Added,
            old_index: None,
            new_index: Some(new_index),
        }
    }

    pub fn modified(old_index: usize, new_index: usize) -> Self {
        Self {
            kind: ChangeKind::Modified,
            old_index: Some(old_index),
            new_index: Some(new_index),
        }
    }

    pub fn removed(old_index: usize) -> Self {
        Self {
            kind: ChangeKind::Removed,
            old_index: Some(old_index),
            new_index: None,
        }
    }
}

/// Query result at one point in time plus the diff since the previous one
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSnapshot {
    pub documents: Vec<RawDocument>,
    pub changes: Vec<DocumentChange>,
}

impl RawSnapshot {
    /// Snapshot whose diff marks every document as added.
    pub fn initial(documents: Vec<RawDocument>) -> Self {
        let changes = (0..documents.len()).map(DocumentChange::added).collect();
        Self { documents, changes }
    }
}
