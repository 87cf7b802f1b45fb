use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use nd_core::{Error, HistoryStorage, HistoryStore, Result};
use tempfile::NamedTempFile;
use tracing::{debug, info};

pub const DEFAULT_HISTORY_FILE: &str = "history.json";

/// History kept as a pretty-printed JSON object of topic key to entries.
///
/// Writes go to a temporary file in the same directory which is then renamed
/// over the target, so a crash mid-write leaves the previous file intact.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl HistoryStorage for JsonFileStorage {
    async fn load(&self) -> Result<HistoryStore> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No history at {}, starting fresh", self.path.display());
                return Ok(HistoryStore::new());
            }
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(HistoryStore::new());
        }

        let history: HistoryStore = serde_json::from_str(&content).map_err(|e| {
            Error::Storage(format!("Corrupt history file {}: {}", self.path.display(), e))
        })?;
        debug!("Loaded {} history entries from {}", history.len(), self.path.display());
        Ok(history)
    }

    async fn persist(&self, history: &HistoryStore) -> Result<()> {
        let body = serde_json::to_string_pretty(history)?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || write_atomically(&path, body.as_bytes()))
            .await
            .map_err(|e| Error::Storage(format!("History writer panicked: {}", e)))??;

        debug!("Saved {} history entries to {}", history.len(), self.path.display());
        Ok(())
    }
}

fn write_atomically(path: &Path, body: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)?;

    let mut tmp = NamedTempFile::new_in(&dir)?;
    tmp.write_all(body)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .map_err(|e| Error::Storage(format!("Failed to replace {}: {}", path.display(), e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nd_core::{Article, Digest};
    use tempfile::tempdir;

    fn sample_history() -> HistoryStore {
        let mut digest = Digest::new();
        digest.insert(
            "World News".to_string(),
            vec![Article::new("Summit opens", "https://summit", "Tue, 03 Jun 2025 14:05:00 GMT")],
        );
        let mut history = HistoryStore::new();
        history.record_sent(&digest);
        history
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_history() {
        let dir = tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("history.json"));
        assert!(storage.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_persist_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("history.json");
        let storage = JsonFileStorage::new(&path);
        let history = sample_history();

        storage.persist(&history).await.unwrap();
        assert_eq!(storage.load().await.unwrap(), history);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"world_news\""));
        assert!(raw.contains("\"publishedAt\": \"Tue, 03 Jun 2025 14:05:00 GMT\""));
        // Only the target file remains after the rename.
        assert_eq!(std::fs::read_dir(path.parent().unwrap()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_legacy_keys_and_empty_topics() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(
            &path,
            r#"{"tech": [{"title": "Old one", "pubDate": "Mon, 02 Jun 2025 10:00:00 GMT"}], "sports": []}"#,
        )
        .unwrap();

        let history = JsonFileStorage::new(&path).load().await.unwrap();

        assert_eq!(history.topic_keys().collect::<Vec<_>>(), vec!["tech"]);
        assert_eq!(history.entries("tech").unwrap()[0].published_at, "Mon, 02 Jun 2025 10:00:00 GMT");
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = JsonFileStorage::new(&path).load().await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }
}
