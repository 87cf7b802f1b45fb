use std::path::PathBuf;
use std::sync::Arc;

use nd_core::{HistoryStorage, Result};

pub mod backends;

pub use backends::*;

/// Where the sent history lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    /// A JSON file on disk.
    Json(PathBuf),
    /// Process memory only; nothing survives the run.
    Memory,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::Json(PathBuf::from(backends::json::DEFAULT_HISTORY_FILE))
    }
}

pub fn create_storage(config: StorageConfig) -> Result<Arc<dyn HistoryStorage>> {
    match config {
        StorageConfig::Json(path) => Ok(Arc::new(JsonFileStorage::new(path))),
        StorageConfig::Memory => Ok(Arc::new(MemoryStorage::new())),
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_storage, StorageConfig};
    pub use nd_core::{HistoryStorage, HistoryStore};
}
