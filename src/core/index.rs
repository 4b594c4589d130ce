use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::Mutex;
use tracing::debug;

use crate::cache::query_cache::QueryCache;
use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::core::stats::EngineStats;
use crate::core::types::{DocId, Document};
use crate::query::parser::QueryParser;
use crate::store::{DocumentStore, MemoryStore, SqliteStore};
use crate::writer::indexer;

/// The engine facade: one store, one cache, one parser behind a single
/// handle.
///
/// The store sits behind one mutex and every write holds it across the whole
/// existence-check → delete → insert → cache-clear sequence, which is the
/// single mutual-exclusion domain the upsert pipeline needs. The cache is an
/// owned field passed by reference into the pipeline, never ambient state.
pub struct SearchIndex<S: DocumentStore> {
    store: Mutex<S>,
    cache: QueryCache,
    parser: QueryParser,
    start_time: Instant,
    query_count: AtomicU64,
    write_count: AtomicU64,
}

impl SearchIndex<SqliteStore> {
    /// Opens a SQLite-backed engine: a file database when the config names
    /// one, an in-memory database otherwise.
    pub fn open(config: Config) -> Result<Self> {
        let store = match &config.db_path {
            Some(path) => SqliteStore::open(path)?,
            None => SqliteStore::open_in_memory()?,
        };
        Ok(Self::with_store(store, &config))
    }
}

impl SearchIndex<MemoryStore> {
    pub fn in_memory() -> Self {
        Self::with_store(MemoryStore::new(), &Config::default())
    }
}

impl<S: DocumentStore> SearchIndex<S> {
    pub fn with_store(store: S, config: &Config) -> Self {
        SearchIndex {
            store: Mutex::new(store),
            cache: QueryCache::new(config.cache_capacity),
            parser: QueryParser::new(config.dialect),
            start_time: Instant::now(),
            query_count: AtomicU64::new(0),
            write_count: AtomicU64::new(0),
        }
    }

    /// Indexes a document: validates the tokens and replaces the id's token
    /// set in full.
    pub fn index_document(&self, id: DocId, tokens: Vec<String>) -> Result<DocId> {
        let document = Document::new(id, tokens);
        let mut store = self.store.lock();
        indexer::upsert_document(&mut *store, &self.cache, &document)?;
        self.write_count.fetch_add(1, Ordering::Relaxed);
        Ok(id)
    }

    /// Answers a boolean membership query with the matching document ids in
    /// ascending order.
    ///
    /// The trimmed expression is the cache key; a hit never reaches the
    /// store. A malformed expression fails before the cache or store are
    /// touched.
    pub fn query(&self, expression: &str) -> Result<Vec<DocId>> {
        let key = expression.trim();
        if key.is_empty() {
            return Err(Error::query_format("empty query expression"));
        }

        if let Some(ids) = self.cache.lookup(key) {
            debug!(%key, "query served from cache");
            return Ok(ids);
        }

        let plan = self.parser.compile(key)?;
        let matches = self.store.lock().evaluate(&plan)?;
        let ids: Vec<DocId> = matches.iter().map(DocId).collect();

        self.cache.insert(key.to_string(), ids.clone());
        self.query_count.fetch_add(1, Ordering::Relaxed);
        Ok(ids)
    }

    /// Direct access to the underlying store, behind the engine's lock.
    pub fn store(&self) -> parking_lot::MutexGuard<'_, S> {
        self.store.lock()
    }

    pub fn stats(&self) -> Result<EngineStats> {
        let total_documents = self.store.lock().document_count()?;
        Ok(EngineStats {
            uptime_secs: self.start_time.elapsed().as_secs(),
            total_documents,
            query_count: self.query_count.load(Ordering::Relaxed),
            write_count: self.write_count.load(Ordering::Relaxed),
            cache: self.cache.stats(),
        })
    }
}
