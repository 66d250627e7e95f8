use std::sync::Arc;

use quiz_core::Clock;
use quiz_core::model::{Profile, QuestionId, QuestionStatsMap, StatsExport};
use serde::Deserialize;
use storage::StatsStore;
use storage::repository::InMemoryRepository;
use tracing::{debug, info};

use crate::error::{ImportError, StatsServiceError};

/// Shape accepted by [`StatsService::import_json`].
///
/// Either key may be missing (or `null`), in which case that record is left
/// as it is.
#[derive(Debug, Deserialize)]
struct StatsImport {
    #[serde(default)]
    stats: Option<QuestionStatsMap>,
    #[serde(default)]
    profile: Option<Profile>,
}

/// Which records an import overwrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub stats_replaced: bool,
    pub profile_replaced: bool,
}

/// Sole writer of the stats store.
///
/// Applies each scored answer to the per-question record and the aggregate
/// profile, and owns reset/export/import of both records.
#[derive(Clone)]
pub struct StatsService {
    clock: Clock,
    store: StatsStore,
}

impl StatsService {
    #[must_use]
    pub fn new(clock: Clock, store: StatsStore) -> Self {
        Self { clock, store }
    }

    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::new(clock, StatsStore::new(Arc::new(InMemoryRepository::new())))
    }

    /// Persist one scored answer and return the updated profile.
    ///
    /// Both records are written together; a failed write leaves the store
    /// as it was.
    ///
    /// # Errors
    ///
    /// Returns `StatsServiceError::Storage` on repository failures.
    pub async fn record_attempt(
        &self,
        question_id: &QuestionId,
        is_correct: bool,
        gained_xp: u32,
    ) -> Result<Profile, StatsServiceError> {
        let now = self.clock.now();
        let mut stats = self.store.load_stats().await?;
        let profile = self.store.load_profile().await?;

        stats
            .entry(question_id.clone())
            .or_default()
            .record_attempt(is_correct, now);
        let profile = profile.apply_attempt(is_correct, gained_xp);

        self.store.save_records(&stats, &profile).await?;
        debug!(
            question = %question_id,
            is_correct,
            gained_xp,
            streak = profile.streak,
            "attempt recorded"
        );
        Ok(profile)
    }

    /// Current per-question stats.
    ///
    /// # Errors
    ///
    /// Returns `StatsServiceError::Storage` on repository failures.
    pub async fn snapshot(&self) -> Result<QuestionStatsMap, StatsServiceError> {
        Ok(self.store.load_stats().await?)
    }

    /// Current aggregate profile.
    ///
    /// # Errors
    ///
    /// Returns `StatsServiceError::Storage` on repository failures.
    pub async fn profile(&self) -> Result<Profile, StatsServiceError> {
        Ok(self.store.load_profile().await?)
    }

    /// Delete both records.
    ///
    /// # Errors
    ///
    /// Returns `StatsServiceError::Storage` on repository failures.
    pub async fn reset(&self) -> Result<(), StatsServiceError> {
        self.store.clear().await?;
        info!("stats reset");
        Ok(())
    }

    /// Both records, verbatim.
    ///
    /// # Errors
    ///
    /// Returns `StatsServiceError::Storage` on repository failures.
    pub async fn export(&self) -> Result<StatsExport, StatsServiceError> {
        Ok(StatsExport {
            stats: self.store.load_stats().await?,
            profile: self.store.load_profile().await?,
        })
    }

    /// Pretty-printed JSON export of both records.
    ///
    /// # Errors
    ///
    /// Returns `StatsServiceError` on repository or encoding failures.
    pub async fn export_json(&self) -> Result<String, StatsServiceError> {
        let export = self.export().await?;
        serde_json::to_string_pretty(&export).map_err(StatsServiceError::Encode)
    }

    /// Overwrite the stored records from an export payload.
    ///
    /// Only the structure is validated. Records present in the payload
    /// replace the stored ones wholesale (no merge); absent records are kept.
    ///
    /// # Errors
    ///
    /// Returns `ImportError` for empty, non-object or malformed payloads
    /// (nothing is written), or when the write itself fails.
    pub async fn import_json(&self, raw: &str) -> Result<ImportSummary, ImportError> {
        if raw.trim().is_empty() {
            return Err(ImportError::Empty);
        }
        let value: serde_json::Value = serde_json::from_str(raw).map_err(ImportError::Malformed)?;
        if !value.is_object() {
            return Err(ImportError::NotAnObject);
        }
        let payload: StatsImport = serde_json::from_value(value).map_err(ImportError::Malformed)?;

        self.store
            .replace_records(payload.stats.as_ref(), payload.profile.as_ref())
            .await?;

        let summary = ImportSummary {
            stats_replaced: payload.stats.is_some(),
            profile_replaced: payload.profile.is_some(),
        };
        info!(
            stats_replaced = summary.stats_replaced,
            profile_replaced = summary.profile_replaced,
            "stats imported"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_now;

    fn service() -> StatsService {
        StatsService::in_memory(Clock::fixed(fixed_now()))
    }

    #[tokio::test]
    async fn correct_attempt_updates_both_records() {
        let svc = service();
        let id = QuestionId::new("q1");

        let profile = svc.record_attempt(&id, true, 25).await.unwrap();
        assert_eq!(profile.xp, 25);
        assert_eq!(profile.streak, 1);
        assert_eq!(profile.total_answered, 1);
        assert_eq!(profile.total_correct, 1);

        let stats = svc.snapshot().await.unwrap();
        let record = &stats[&id];
        assert_eq!((record.attempts, record.correct, record.wrong), (1, 1, 0));
        assert_eq!(record.last_seen, Some(fixed_now()));
        assert_eq!(record.last_correct, Some(fixed_now()));
    }

    #[tokio::test]
    async fn wrong_attempt_resets_streak() {
        let svc = service();
        let id = QuestionId::new("q1");

        svc.record_attempt(&id, true, 25).await.unwrap();
        svc.record_attempt(&id, true, 25).await.unwrap();
        let profile = svc.record_attempt(&id, false, 2).await.unwrap();

        assert_eq!(profile.streak, 0);
        assert_eq!(profile.xp, 52);
        let record = &svc.snapshot().await.unwrap()[&id];
        assert_eq!(record.attempts, record.correct + record.wrong);
        assert_eq!(record.wrong, 1);
    }

    #[tokio::test]
    async fn reset_restores_defaults() {
        let svc = service();
        svc.record_attempt(&QuestionId::new("q1"), true, 15)
            .await
            .unwrap();

        svc.reset().await.unwrap();

        assert_eq!(svc.profile().await.unwrap(), Profile::default());
        assert!(svc.snapshot().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn export_then_import_into_fresh_store() {
        let source = service();
        source
            .record_attempt(&QuestionId::new("q1"), false, 2)
            .await
            .unwrap();
        let json = source.export_json().await.unwrap();

        let target = service();
        let summary = target.import_json(&json).await.unwrap();

        assert!(summary.stats_replaced && summary.profile_replaced);
        assert_eq!(target.export().await.unwrap(), source.export().await.unwrap());
    }

    #[tokio::test]
    async fn import_without_profile_keeps_existing_profile() {
        let svc = service();
        let before = svc
            .record_attempt(&QuestionId::new("q1"), true, 35)
            .await
            .unwrap();

        let summary = svc
            .import_json(r#"{"stats": {"q2": {"attempts": 2, "correct": 0, "wrong": 2}}}"#)
            .await
            .unwrap();

        assert!(summary.stats_replaced);
        assert!(!summary.profile_replaced);
        assert_eq!(svc.profile().await.unwrap(), before);
        let stats = svc.snapshot().await.unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[&QuestionId::new("q2")].wrong, 2);
    }

    #[tokio::test]
    async fn malformed_imports_leave_state_untouched() {
        let svc = service();
        svc.record_attempt(&QuestionId::new("q1"), true, 15)
            .await
            .unwrap();
        let before = svc.export().await.unwrap();

        assert!(matches!(svc.import_json("   ").await, Err(ImportError::Empty)));
        assert!(matches!(
            svc.import_json("{ nope").await,
            Err(ImportError::Malformed(_))
        ));
        assert!(matches!(
            svc.import_json("[1, 2]").await,
            Err(ImportError::NotAnObject)
        ));
        assert!(matches!(
            svc.import_json(r#"{"stats": [], "profile": {"xp": 1}}"#).await,
            Err(ImportError::Malformed(_))
        ));

        assert_eq!(svc.export().await.unwrap(), before);
    }

    #[tokio::test]
    async fn array_shaped_records_are_rejected() {
        let svc = service();
        svc.record_attempt(&QuestionId::new("q1"), true, 15)
            .await
            .unwrap();
        let before = svc.export().await.unwrap();

        assert!(matches!(
            svc.import_json(r#"{"profile": [999, 7, 3]}"#).await,
            Err(ImportError::Malformed(_))
        ));
        assert!(matches!(
            svc.import_json(r#"{"stats": {"q1": [5, 1, 1]}}"#).await,
            Err(ImportError::Malformed(_))
        ));
        assert!(matches!(
            svc.import_json(r#"{"stats": [], "profile": {}}"#).await,
            Err(ImportError::Malformed(_))
        ));

        assert_eq!(svc.export().await.unwrap(), before);
    }
}
