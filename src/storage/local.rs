//! Local filesystem history store.
//!
//! Writes go through a temp file and a rename so an interrupted write never
//! leaves a truncated history behind. Appends are serialized per store so
//! concurrent passes never drop each other's entries.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::HistoryItem;
use crate::storage::HistoryStore;

/// Default number of history entries kept.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// JSON-file history backend.
#[derive(Debug, Clone)]
pub struct LocalHistoryStore {
    path: PathBuf,
    limit: usize,
    /// Held across each read-modify-write of the file
    write_lock: Arc<Mutex<()>>,
}

impl LocalHistoryStore {
    /// Create a store backed by the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_limit(path, DEFAULT_HISTORY_LIMIT)
    }

    /// Create a store keeping at most `limit` entries.
    pub fn with_limit(path: impl Into<PathBuf>, limit: usize) -> Self {
        Self {
            path: path.into(),
            limit: limit.max(1),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn write_items(&self, items: &[HistoryItem]) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(items)?;
        self.write_bytes(&bytes).await
    }
}

#[async_trait]
impl HistoryStore for LocalHistoryStore {
    async fn append(&self, item: HistoryItem) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut items = self.load().await?;
        items.insert(0, item);
        items.truncate(self.limit);
        self.write_items(&items).await
    }

    async fn load(&self) -> Result<Vec<HistoryItem>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    async fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write_items(&[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FillStatus;
    use tempfile::TempDir;

    fn item(domain: &str, filled_count: usize) -> HistoryItem {
        HistoryItem {
            timestamp: 1_700_000_000_000,
            domain: domain.to_string(),
            filled_count,
            status: FillStatus::Success,
            message: None,
        }
    }

    #[tokio::test]
    async fn test_load_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = LocalHistoryStore::new(tmp.path().join("history.json"));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_newest_first() {
        let tmp = TempDir::new().unwrap();
        let store = LocalHistoryStore::new(tmp.path().join("history.json"));

        store.append(item("a.com", 1)).await.unwrap();
        store.append(item("b.com", 2)).await.unwrap();

        let items = store.load().await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].domain, "b.com");
        assert_eq!(items[1].domain, "a.com");
    }

    #[tokio::test]
    async fn test_history_is_capped() {
        let tmp = TempDir::new().unwrap();
        let store = LocalHistoryStore::with_limit(tmp.path().join("nested/history.json"), 3);

        for i in 0..5 {
            store.append(item(&format!("site{i}.com"), i)).await.unwrap();
        }

        let items = store.load().await.unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].domain, "site4.com");
        assert_eq!(items[2].domain, "site2.com");
    }

    #[tokio::test]
    async fn test_clear() {
        let tmp = TempDir::new().unwrap();
        let store = LocalHistoryStore::new(tmp.path().join("history.json"));
        store.append(item("a.com", 1)).await.unwrap();

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_keep_every_entry() {
        let tmp = TempDir::new().unwrap();
        let store = Arc::new(LocalHistoryStore::new(tmp.path().join("history.json")));

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.append(item(&format!("site{i}.com"), i)).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let items = store.load().await.unwrap();
        assert_eq!(items.len(), 10);
        let mut counts: Vec<_> = items.iter().map(|i| i.filled_count).collect();
        counts.sort_unstable();
        assert_eq!(counts, (0..10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_default_cap_is_fifty() {
        let tmp = TempDir::new().unwrap();
        let store = LocalHistoryStore::new(tmp.path().join("history.json"));
        for i in 0..(DEFAULT_HISTORY_LIMIT + 5) {
            store.append(item("a.com", i)).await.unwrap();
        }
        assert_eq!(store.load().await.unwrap().len(), DEFAULT_HISTORY_LIMIT);
    }
}
