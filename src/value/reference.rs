//! Document references
//!
//! A reference is the full slash-separated path of one document:
//! `collection/id`, or deeper for subcollections
//! (`users/alice/orders/42`). Segment count is always even.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::{ValueError, ValueResult};

/// Identity of one persisted document
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentRef {
    path: String,
}

impl DocumentRef {
    /// Create a reference to `id` inside a collection path.
    pub fn new(collection: &str, id: &str) -> ValueResult<Self> {
        Self::parse(&format!("{}/{}", collection, id))
    }

    /// Parse a full document path.
    pub fn parse(path: &str) -> ValueResult<Self> {
        let trimmed = path.trim_matches('/');
        if trimmed.is_empty() {
            return Err(ValueError::InvalidPath {
                path: path.to_string(),
                reason: "path is empty",
            });
        }

        let segments: Vec<&str> = trimmed.split('/').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(ValueError::InvalidPath {
                path: path.to_string(),
                reason: "path contains an empty segment",
            });
        }
        if segments.len() % 2 != 0 {
            return Err(ValueError::InvalidPath {
                path: path.to_string(),
                reason: "document paths need an even number of segments",
            });
        }

        Ok(Self {
            path: trimmed.to_string(),
        })
    }

    /// Last path segment.
    pub fn id(&self) -> &str {
        match self.path.rfind('/') {
            Some(pos) => &self.path[pos + 1..],
            None => &self.path,
        }
    }

    /// Full path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path of the collection holding this document.
    pub fn collection_path(&self) -> &str {
        match self.path.rfind('/') {
            Some(pos) => &self.path[..pos],
            None => "",
        }
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}

impl TryFrom<String> for DocumentRef {
    type Error = ValueError;

    fn try_from(path: String) -> ValueResult<Self> {
        Self::parse(&path)
    }
}

impl From<DocumentRef> for String {
    fn from(reference: DocumentRef) -> Self {
        reference.path
    }
}
