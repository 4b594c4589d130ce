use tracing::info;

use crate::analysis::validator;
use crate::cache::query_cache::QueryCache;
use crate::core::error::Result;
use crate::core::types::Document;
use crate::store::DocumentStore;

/// Upserts a document's full token set.
///
/// First submission for an id creates the document row; a later submission
/// deletes every existing token row and inserts the new set (the row itself
/// is kept). On success the query cache is cleared in full; the write's
/// effect on individual cached postings is not analyzed.
///
/// The existence-check → delete → insert sequence is not transactional: a
/// failing step leaves the earlier steps in place and surfaces the store
/// error for the failing operation.
pub fn upsert_document<S: DocumentStore>(
    store: &mut S,
    cache: &QueryCache,
    document: &Document,
) -> Result<()> {
    validator::validate_tokens(&document.tokens)?;

    if store.exists(document.id)? {
        store.delete_tokens(document.id)?;
    } else {
        store.insert_document(document.id)?;
    }

    store.insert_tokens(document.id, &document.tokens)?;

    cache.clear();
    info!(
        id = document.id.0,
        tokens = document.tokens.len(),
        "indexed document"
    );
    Ok(())
}
