use std::sync::Arc;

use async_trait::async_trait;
use nd_core::{HistoryStorage, HistoryStore, Result};
use tokio::sync::RwLock;

/// Keeps the history in process memory. Used by dry runs and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    store: Arc<RwLock<HistoryStore>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(history: HistoryStore) -> Self {
        Self {
            store: Arc::new(RwLock::new(history)),
        }
    }

    /// Current contents, for inspection.
    pub async fn snapshot(&self) -> HistoryStore {
        self.store.read().await.clone()
    }
}

#[async_trait]
impl HistoryStorage for MemoryStorage {
    async fn load(&self) -> Result<HistoryStore> {
        Ok(self.store.read().await.clone())
    }

    async fn persist(&self, history: &HistoryStore) -> Result<()> {
        *self.store.write().await = history.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nd_core::{Article, Digest};

    #[tokio::test]
    async fn test_memory_storage() {
        let storage = MemoryStorage::new();
        assert!(storage.load().await.unwrap().is_empty());

        let mut digest = Digest::new();
        digest.insert(
            "Tech".to_string(),
            vec![Article::new("Chip stocks climb", "https://chips", "Tue, 03 Jun 2025 14:05:00 GMT")],
        );
        let mut history = HistoryStore::new();
        history.record_sent(&digest);
        storage.persist(&history).await.unwrap();

        assert_eq!(storage.load().await.unwrap(), history);
        assert_eq!(storage.snapshot().await.len(), 1);
    }
}
