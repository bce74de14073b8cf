//! Snapshot loading from the local data directory.
//!
//! The ingestion collaborator drops normalized JSONL files into the data
//! directory; this module only reads them:
//! - `picks.jsonl`, `events.jsonl`, `matches.jsonl`
//! - `cards.jsonl` (optional metadata)
//! - `pools.jsonl` (optional registered card lists)

mod jsonl;
mod snapshot;

pub use jsonl::*;
pub use snapshot::*;

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed line {line} in {path:?}: {source}")]
    BadLine {
        path: PathBuf,
        line: usize,
        source: serde_json::Error,
    },

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Path of an entity file.
    pub fn entity_path(&self, entity: EntityType) -> PathBuf {
        self.data_dir.join(entity.filename())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_config_paths() {
        let config = StorageConfig::new(PathBuf::from("/data"));

        assert_eq!(
            config.entity_path(EntityType::Pick),
            PathBuf::from("/data/picks.jsonl")
        );
        assert_eq!(
            config.entity_path(EntityType::Pool),
            PathBuf::from("/data/pools.jsonl")
        );
    }

    #[test]
    fn test_storage_config_default() {
        let config = StorageConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("./data"));
    }
}
