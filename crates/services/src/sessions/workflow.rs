use std::num::NonZeroUsize;
use std::sync::Arc;

use quiz_core::model::{Profile, QuestionBank, QuizFilters, QuizMode};
use tracing::{debug, info, warn};

use super::engine::{QuizSession, ScoredAnswer};
use super::plan::DeckBuilder;
use super::results::QuizResults;
use crate::error::SessionError;
use crate::stats_service::StatsService;

/// Default number of questions per quiz.
pub const DEFAULT_QUIZ_SIZE: NonZeroUsize = match NonZeroUsize::new(10) {
    Some(n) => n,
    None => unreachable!(),
};

/// Filters plus requested deck size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizRequest {
    pub filters: QuizFilters,
    pub count: NonZeroUsize,
}

impl QuizRequest {
    #[must_use]
    pub fn new(filters: QuizFilters, count: NonZeroUsize) -> Self {
        Self { filters, count }
    }
}

impl Default for QuizRequest {
    fn default() -> Self {
        Self::new(QuizFilters::default(), DEFAULT_QUIZ_SIZE)
    }
}

/// What was drawn when a quiz started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizStart {
    pub deck_len: usize,
    pub pool_size: usize,
    pub fell_back: bool,
}

/// Result of answering the current question.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerResult {
    pub answer: ScoredAnswer,
    pub explanation: Option<String>,
    /// Profile after this answer was persisted.
    pub profile: Profile,
}

/// Orchestrates deck selection, scoring and stats persistence.
#[derive(Clone)]
pub struct QuizLoopService {
    bank: Arc<QuestionBank>,
    stats: Arc<StatsService>,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(bank: Arc<QuestionBank>, stats: Arc<StatsService>) -> Self {
        Self { bank, stats }
    }

    #[must_use]
    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    /// Distinct topics available for the topic filter.
    #[must_use]
    pub fn topics(&self) -> Vec<&str> {
        self.bank.topics()
    }

    /// Draw a deck for `request` and start `session` on it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Stats` if the stats snapshot cannot be read.
    pub async fn start_quiz(
        &self,
        session: &mut QuizSession,
        request: &QuizRequest,
    ) -> Result<QuizStart, SessionError> {
        let stats = self.stats.snapshot().await?;
        let plan = DeckBuilder::new(&self.bank, &request.filters, &stats)
            .build(request.count, &mut rand::rng());

        let start = QuizStart {
            deck_len: plan.len(),
            pool_size: plan.pool_size,
            fell_back: plan.fell_back,
        };
        info!(
            topic = %request.filters.topic,
            difficulty = %request.filters.difficulty,
            mode = %request.filters.mode,
            deck_len = start.deck_len,
            pool_size = start.pool_size,
            "quiz started"
        );
        session.start(plan.questions);
        Ok(start)
    }

    /// Start a new quiz over questions answered wrong more often than right,
    /// keeping the topic and difficulty of `request`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Stats` if the stats snapshot cannot be read.
    pub async fn retry_incorrect(
        &self,
        session: &mut QuizSession,
        request: &QuizRequest,
    ) -> Result<QuizStart, SessionError> {
        let retry = QuizRequest::new(
            request.filters.clone().with_mode(QuizMode::ReviewWrong),
            request.count,
        );
        self.start_quiz(session, &retry).await
    }

    /// Score `selected` for the current question and persist the attempt.
    ///
    /// Returns `Ok(None)` when the session is not waiting for an answer (for
    /// example a second click on the same question); nothing is persisted
    /// then. The session only moves to `Answered` after the attempt is
    /// stored.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Stats` if persistence fails; the session is left
    /// on the unanswered question.
    pub async fn answer_current(
        &self,
        session: &mut QuizSession,
        selected: usize,
    ) -> Result<Option<AnswerResult>, SessionError> {
        let Some(answer) = session.evaluate(selected) else {
            return Ok(None);
        };

        let profile = self
            .stats
            .record_attempt(&answer.question_id, answer.is_correct, answer.xp)
            .await?;

        if !session.apply(&answer) {
            warn!(question = %answer.question_id, "session moved while the attempt was stored");
            return Ok(None);
        }

        let explanation = session
            .current_question()
            .and_then(|q| q.explanation())
            .map(str::to_string);
        debug!(
            question = %answer.question_id,
            is_correct = answer.is_correct,
            xp = answer.xp,
            "answer scored"
        );

        Ok(Some(AnswerResult {
            answer,
            explanation,
            profile,
        }))
    }

    /// Results for a finished session; `None` while the quiz is running.
    #[must_use]
    pub fn results(&self, session: &QuizSession) -> Option<QuizResults> {
        session
            .is_finished()
            .then(|| QuizResults::summarize(session, &self.bank))
    }

    /// End the quiz now and summarize what was scored so far.
    #[must_use]
    pub fn end(&self, session: &mut QuizSession) -> QuizResults {
        session.end();
        let results = QuizResults::summarize(session, &self.bank);
        info!(
            answered = results.answered,
            correct = results.correct,
            skipped = results.skipped,
            xp = results.xp_earned,
            "quiz finished"
        );
        results
    }
}
