use async_trait::async_trait;

use crate::history::HistoryStore;
use crate::Result;

#[async_trait]
pub trait HistoryStorage: Send + Sync {
    /// Loads the stored history, or an empty one if nothing was stored yet.
    async fn load(&self) -> Result<HistoryStore>;

    /// Replaces the stored history. Must leave the previous state intact if
    /// the write is interrupted.
    async fn persist(&self, history: &HistoryStore) -> Result<()>;
}
