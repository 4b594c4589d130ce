//! Boolean membership search over an inverted token index.
//!
//! Documents are flat sets of alphanumeric tokens keyed by caller-supplied
//! integer ids. Queries are boolean filter expressions over token literals
//! (`rust & (db | web)`), compiled to set-algebra plans and executed against
//! the posting relation in a relational store, with results memoized in a
//! full-reset query cache.

pub mod analysis;
pub mod cache;
pub mod core;
pub mod query;
pub mod store;
pub mod writer;

pub use crate::core::config::Config;
pub use crate::core::error::{Error, ErrorKind, Result};
pub use crate::core::index::SearchIndex;
pub use crate::core::types::{DocId, Document};
pub use crate::query::parser::QueryDialect;
pub use crate::store::{DocumentStore, MemoryStore, SqliteStore};
