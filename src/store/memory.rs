use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use roaring::RoaringBitmap;

use crate::core::error::Result;
use crate::core::types::DocId;
use crate::store::DocumentStore;

/// In-memory posting map, content → owning document ids.
///
/// Plan evaluation uses the trait's default fold. Posting lookups are
/// counted so callers can observe whether a query reached the store at all.
pub struct MemoryStore {
    postings: HashMap<String, RoaringBitmap>,
    documents: HashMap<DocId, Vec<String>>,
    posting_lookups: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            postings: HashMap::new(),
            documents: HashMap::new(),
            posting_lookups: AtomicU64::new(0),
        }
    }

    /// Number of posting lookups served since construction.
    pub fn posting_lookups(&self) -> u64 {
        self.posting_lookups.load(Ordering::Relaxed)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        MemoryStore::new()
    }
}

impl DocumentStore for MemoryStore {
    fn exists(&self, id: DocId) -> Result<bool> {
        Ok(self.documents.contains_key(&id))
    }

    fn insert_document(&mut self, id: DocId) -> Result<()> {
        self.documents.insert(id, Vec::new());
        Ok(())
    }

    fn delete_tokens(&mut self, id: DocId) -> Result<()> {
        let Some(contents) = self.documents.get_mut(&id) else {
            return Ok(());
        };

        for content in contents.drain(..) {
            if let Some(posting) = self.postings.get_mut(&content) {
                posting.remove(id.0);
            }
        }
        self.postings.retain(|_, posting| !posting.is_empty());
        Ok(())
    }

    fn insert_tokens(&mut self, id: DocId, contents: &[String]) -> Result<()> {
        for content in contents {
            self.postings.entry(content.clone()).or_default().insert(id.0);
        }
        self.documents
            .entry(id)
            .or_default()
            .extend(contents.iter().cloned());
        Ok(())
    }

    fn postings(&self, literal: &str) -> Result<RoaringBitmap> {
        self.posting_lookups.fetch_add(1, Ordering::Relaxed);
        Ok(self.postings.get(literal).cloned().unwrap_or_default())
    }

    fn document_count(&self) -> Result<u64> {
        Ok(self.documents.len() as u64)
    }
}
