use serde::{Deserialize, Serialize};

use crate::cache::query_cache::CacheStats;

/// Engine snapshot for monitoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStats {
    pub uptime_secs: u64,
    pub total_documents: u64,
    pub query_count: u64,
    pub write_count: u64,
    pub cache: CacheStats,
}
