use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::types::DocId;

/// Memoizes trimmed query expressions to their resolved id lists.
///
/// Eviction is a full reset: inserting into a cache already holding
/// `capacity` entries clears the whole map first. Any successful indexing
/// write also clears the map in full.
pub struct QueryCache {
    entries: RwLock<HashMap<String, Vec<DocId>>>,
    capacity: usize,
    hit_count: AtomicU64,
    miss_count: AtomicU64,
}

impl QueryCache {
    pub fn new(capacity: usize) -> Self {
        QueryCache {
            entries: RwLock::new(HashMap::new()),
            capacity,
            hit_count: AtomicU64::new(0),
            miss_count: AtomicU64::new(0),
        }
    }

    pub fn lookup(&self, key: &str) -> Option<Vec<DocId>> {
        let entries = self.entries.read();
        match entries.get(key) {
            Some(ids) => {
                self.hit_count.fetch_add(1, Ordering::Relaxed);
                Some(ids.clone())
            }
            None => {
                self.miss_count.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn insert(&self, key: String, ids: Vec<DocId>) {
        let mut entries = self.entries.write();
        if entries.len() >= self.capacity {
            debug!(capacity = self.capacity, "query cache at capacity, resetting");
            entries.clear();
        }
        entries.insert(key, ids);
    }

    /// Drops every entry. Called unconditionally after a successful write.
    pub fn clear(&self) {
        let mut entries = self.entries.write();
        if !entries.is_empty() {
            debug!(entries = entries.len(), "clearing query cache");
        }
        entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hit_count: self.hit_count.load(Ordering::Relaxed),
            miss_count: self.miss_count.load(Ordering::Relaxed),
            size: self.len(),
            capacity: self.capacity,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub hit_count: u64,
    pub miss_count: u64,
    pub size: usize,
    pub capacity: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hit_count + self.miss_count;
        if total == 0 {
            0.0
        } else {
            self.hit_count as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[u32]) -> Vec<DocId> {
        values.iter().copied().map(DocId).collect()
    }

    #[test]
    fn lookup_returns_inserted_value() {
        let cache = QueryCache::new(100);
        cache.insert("a & b".to_string(), ids(&[1, 2]));
        assert_eq!(cache.lookup("a & b"), Some(ids(&[1, 2])));
        assert_eq!(cache.lookup("missing"), None);
    }

    #[test]
    fn insert_at_capacity_resets_whole_map() {
        let cache = QueryCache::new(100);
        for i in 0..100 {
            cache.insert(format!("q{}", i), ids(&[i]));
        }
        assert_eq!(cache.len(), 100);

        // The 101st distinct key wipes the map before landing.
        cache.insert("q100".to_string(), ids(&[100]));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.lookup("q100"), Some(ids(&[100])));
        assert_eq!(cache.lookup("q0"), None);
    }

    #[test]
    fn clear_empties_the_map() {
        let cache = QueryCache::new(100);
        cache.insert("a".to_string(), ids(&[1]));
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn stats_track_hits_and_misses() {
        let cache = QueryCache::new(100);
        cache.insert("a".to_string(), ids(&[1]));
        cache.lookup("a");
        cache.lookup("a");
        cache.lookup("b");

        let stats = cache.stats();
        assert_eq!(stats.hit_count, 2);
        assert_eq!(stats.miss_count, 1);
        assert_eq!(stats.size, 1);
        assert!((stats.hit_rate() - 2.0 / 3.0).abs() < 1e-9);
    }
}
