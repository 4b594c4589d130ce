use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::query::parser::QueryDialect;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// SQLite database file. `None` opens an in-memory database.
    pub db_path: Option<PathBuf>,
    /// Query cache capacity; the cache fully resets when inserting at capacity.
    pub cache_capacity: usize,
    /// Expression grammar: general recursive grammar, or the legacy bounded one.
    pub dialect: QueryDialect,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: None,
            cache_capacity: 100,
            dialect: QueryDialect::General,
        }
    }
}

impl Config {
    pub fn with_db_path(path: impl Into<PathBuf>) -> Self {
        Config {
            db_path: Some(path.into()),
            ..Config::default()
        }
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let config = serde_json::from_str(&raw)?;
        Ok(config)
    }
}
