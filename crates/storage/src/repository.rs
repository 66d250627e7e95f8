use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::stats_store::StatsStore;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A single key/value pair written by [`KeyValueStore::put_all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvEntry {
    pub key: String,
    pub value: String,
}

impl KvEntry {
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Durable blob store addressed by string keys.
///
/// Multi-key writes and deletes are all-or-nothing: a reader never observes
/// some entries of a batch applied and others not.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or overwrite every entry in one atomic write.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the batch cannot be stored; nothing is
    /// written in that case.
    async fn put_all(&self, entries: &[KvEntry]) -> Result<(), StorageError>;

    /// Delete every key in one atomic write. Missing keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the batch cannot be applied.
    async fn remove_all(&self, keys: &[&str]) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl KeyValueStore for InMemoryRepository {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn put_all(&self, entries: &[KvEntry]) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        for entry in entries {
            guard.insert(entry.key.clone(), entry.value.clone());
        }
        Ok(())
    }

    async fn remove_all(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        for key in keys {
            guard.remove(*key);
        }
        Ok(())
    }
}

/// Wraps the key-value backend behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub kv: Arc<dyn KeyValueStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let kv: Arc<dyn KeyValueStore> = Arc::new(InMemoryRepository::new());
        Self { kv }
    }

    /// Typed access to the stats and profile records.
    #[must_use]
    pub fn stats(&self) -> StatsStore {
        StatsStore::new(Arc::clone(&self.kv))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_and_remove_round_trip() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.get("a").await.unwrap(), None);

        repo.put_all(&[KvEntry::new("a", "1"), KvEntry::new("b", "2")])
            .await
            .unwrap();
        assert_eq!(repo.get("a").await.unwrap().as_deref(), Some("1"));
        assert_eq!(repo.get("b").await.unwrap().as_deref(), Some("2"));

        repo.put_all(&[KvEntry::new("a", "3")]).await.unwrap();
        assert_eq!(repo.get("a").await.unwrap().as_deref(), Some("3"));

        repo.remove_all(&["a", "missing"]).await.unwrap();
        assert_eq!(repo.get("a").await.unwrap(), None);
        assert_eq!(repo.get("b").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn clones_share_state() {
        let repo = InMemoryRepository::new();
        let other = repo.clone();
        repo.put_all(&[KvEntry::new("k", "v")]).await.unwrap();
        assert_eq!(other.get("k").await.unwrap().as_deref(), Some("v"));
    }
}
