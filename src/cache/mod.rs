pub mod query_cache;
