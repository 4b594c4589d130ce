use roaring::RoaringBitmap;

use crate::core::error::Result;
use crate::core::types::DocId;
use crate::query::plan::QueryPlan;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Storage seam for the inverted index.
///
/// Access is restricted to literal posting lookups and bulk insert/delete of
/// token rows; plan evaluation may be pushed down to the engine's own query
/// facility or computed from `postings`, with identical result sets either
/// way.
pub trait DocumentStore {
    /// Point lookup of a document row.
    fn exists(&self, id: DocId) -> Result<bool>;

    /// Inserts a new document row. The row is never deleted afterwards.
    fn insert_document(&mut self, id: DocId) -> Result<()>;

    /// Deletes every token row owned by `id` (full reindex path).
    fn delete_tokens(&mut self, id: DocId) -> Result<()>;

    /// Bulk-inserts one token row per content, linked to `id`.
    fn insert_tokens(&mut self, id: DocId, contents: &[String]) -> Result<()>;

    /// Documents whose token set contains an exact, case-sensitive match.
    fn postings(&self, literal: &str) -> Result<RoaringBitmap>;

    fn document_count(&self) -> Result<u64>;

    /// Bottom-up fold over postings: union is a bitmap or, intersect a
    /// bitmap and. Stores with a native query facility may override this.
    fn evaluate(&self, plan: &QueryPlan) -> Result<RoaringBitmap> {
        match plan {
            QueryPlan::Literal(literal) => self.postings(literal),
            QueryPlan::Union(children) => {
                let mut acc = RoaringBitmap::new();
                for child in children {
                    acc |= self.evaluate(child)?;
                }
                Ok(acc)
            }
            QueryPlan::Intersect(children) => {
                let mut iter = children.iter();
                let mut acc = match iter.next() {
                    Some(first) => self.evaluate(first)?,
                    None => return Ok(RoaringBitmap::new()),
                };
                for child in iter {
                    if acc.is_empty() {
                        break;
                    }
                    acc &= self.evaluate(child)?;
                }
                Ok(acc)
            }
        }
    }
}
