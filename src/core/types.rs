use std::fmt;

use serde::{Deserialize, Serialize};

/// Caller-supplied document identifier, unique and immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocId(pub u32);

impl DocId {
    pub fn new(id: u32) -> Self {
        DocId(id)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl From<u32> for DocId {
    fn from(id: u32) -> Self {
        DocId(id)
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A document submission: an id and its full, ordered token set.
/// Re-indexing the same id replaces the entire token set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub tokens: Vec<String>,
}

impl Document {
    pub fn new(id: DocId, tokens: Vec<String>) -> Self {
        Document { id, tokens }
    }
}
