use std::sync::Arc;

use quiz_core::model::{Profile, QuestionStatsMap};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::repository::{KeyValueStore, KvEntry, StorageError};

/// Key holding the per-question stats map.
pub const STATS_KEY: &str = "quiz_stats_v1";

/// Key holding the aggregate profile.
pub const PROFILE_KEY: &str = "quiz_profile_v1";

fn encode<T: Serialize>(key: &str, value: &T) -> Result<KvEntry, StorageError> {
    let raw = serde_json::to_string(value)
        .map_err(|e| StorageError::Serialization(format!("{key}: {e}")))?;
    Ok(KvEntry::new(key, raw))
}

/// Typed view over the two durable stats records.
///
/// Unreadable records are never surfaced as errors: a value that fails to
/// decode is logged and replaced by the default record.
#[derive(Clone)]
pub struct StatsStore {
    kv: Arc<dyn KeyValueStore>,
}

impl StatsStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    async fn load_or_default<T: DeserializeOwned + Default>(
        &self,
        key: &str,
    ) -> Result<T, StorageError> {
        let Some(raw) = self.kv.get(key).await? else {
            return Ok(T::default());
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!(key, error = %err, "stored record is unreadable, using defaults");
                Ok(T::default())
            }
        }
    }

    /// Load the per-question stats map (empty when absent or unreadable).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only when the backend itself fails.
    pub async fn load_stats(&self) -> Result<QuestionStatsMap, StorageError> {
        self.load_or_default(STATS_KEY).await
    }

    /// Load the aggregate profile (zeros when absent or unreadable).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only when the backend itself fails.
    pub async fn load_profile(&self) -> Result<Profile, StorageError> {
        self.load_or_default(PROFILE_KEY).await
    }

    /// Persist both records in one atomic write.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if encoding or the write fails.
    pub async fn save_records(
        &self,
        stats: &QuestionStatsMap,
        profile: &Profile,
    ) -> Result<(), StorageError> {
        let entries = [encode(STATS_KEY, stats)?, encode(PROFILE_KEY, profile)?];
        self.kv.put_all(&entries).await?;
        debug!(questions = stats.len(), xp = profile.xp, "stats records saved");
        Ok(())
    }

    /// Overwrite whichever records are provided, leaving the others as-is.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if encoding or the write fails.
    pub async fn replace_records(
        &self,
        stats: Option<&QuestionStatsMap>,
        profile: Option<&Profile>,
    ) -> Result<(), StorageError> {
        let mut entries = Vec::with_capacity(2);
        if let Some(stats) = stats {
            entries.push(encode(STATS_KEY, stats)?);
        }
        if let Some(profile) = profile {
            entries.push(encode(PROFILE_KEY, profile)?);
        }
        if entries.is_empty() {
            return Ok(());
        }
        self.kv.put_all(&entries).await
    }

    /// Delete both records; later reads observe defaults.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the delete fails.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.kv.remove_all(&[STATS_KEY, PROFILE_KEY]).await
    }
}
