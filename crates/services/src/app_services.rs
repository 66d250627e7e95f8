use std::path::Path;
use std::sync::Arc;

use quiz_core::model::QuestionBank;
use storage::{Storage, load_question_bank};
use tracing::info;

use crate::Clock;
use crate::error::AppServicesError;
use crate::sessions::QuizLoopService;
use crate::stats_service::StatsService;

/// Assembles the app-facing services over one bank and one stats store.
#[derive(Clone)]
pub struct QuizServices {
    bank: Arc<QuestionBank>,
    stats: Arc<StatsService>,
    quiz_loop: Arc<QuizLoopService>,
}

impl QuizServices {
    /// Build services backed by `SQLite` storage and a bank file on disk.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or bank loading fails.
    pub async fn new_sqlite(
        db_url: &str,
        bank_path: impl AsRef<Path>,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let bank = load_question_bank(bank_path).await?;
        info!(questions = bank.len(), "services ready");
        Ok(Self::from_parts(bank, &storage, clock))
    }

    /// Build services over an in-memory store, for tests and demos.
    #[must_use]
    pub fn in_memory(bank: QuestionBank, clock: Clock) -> Self {
        Self::from_parts(bank, &Storage::in_memory(), clock)
    }

    fn from_parts(bank: QuestionBank, storage: &Storage, clock: Clock) -> Self {
        let bank = Arc::new(bank);
        let stats = Arc::new(StatsService::new(clock, storage.stats()));
        let quiz_loop = Arc::new(QuizLoopService::new(
            Arc::clone(&bank),
            Arc::clone(&stats),
        ));
        Self {
            bank,
            stats,
            quiz_loop,
        }
    }

    #[must_use]
    pub fn bank(&self) -> Arc<QuestionBank> {
        Arc::clone(&self.bank)
    }

    #[must_use]
    pub fn stats(&self) -> Arc<StatsService> {
        Arc::clone(&self.stats)
    }

    #[must_use]
    pub fn quiz_loop(&self) -> Arc<QuizLoopService> {
        Arc::clone(&self.quiz_loop)
    }
}
