use std::fmt;

use quiz_core::model::{OPTION_COUNT, Question, QuestionId};
use quiz_core::xp::xp_for_answer;
use tracing::debug;

use super::progress::SessionProgress;

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Where the quiz currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No active deck.
    #[default]
    Idle,
    /// Current question shown, not yet answered.
    InQuestion,
    /// Current question answered, feedback visible.
    Answered,
    /// Deck exhausted or quiz ended early.
    Finished,
}

//
// ─── SCORED ANSWER ─────────────────────────────────────────────────────────────
//

/// Outcome of answering the question at one deck position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredAnswer {
    pub position: usize,
    pub question_id: QuestionId,
    pub selected: usize,
    pub correct_index: usize,
    pub is_correct: bool,
    pub xp: u32,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Single-player quiz state machine.
///
/// Each deck position is either scored once or skipped once, never both.
/// Calls that do not fit the current state are ignored and report `None` or
/// `false`, so repeated clicks are harmless.
#[derive(Default)]
pub struct QuizSession {
    state: SessionState,
    deck: Vec<Question>,
    index: usize,
    correct: u32,
    wrong: u32,
    skipped: u32,
    xp_earned: u32,
    wrong_ids: Vec<QuestionId>,
    last_answer: Option<ScoredAnswer>,
}

impl QuizSession {
    /// A session with no deck.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a quiz over `deck`, discarding any previous quiz.
    ///
    /// An empty deck finishes immediately.
    pub fn start(&mut self, deck: Vec<Question>) {
        *self = Self {
            state: if deck.is_empty() {
                SessionState::Finished
            } else {
                SessionState::InQuestion
            },
            deck,
            ..Self::default()
        };
    }

    /// Return to `Idle`, dropping the deck.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state == SessionState::Finished
    }

    #[must_use]
    pub fn deck(&self) -> &[Question] {
        &self.deck
    }

    /// 0-based cursor into the deck.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn wrong(&self) -> u32 {
        self.wrong
    }

    #[must_use]
    pub fn skipped(&self) -> u32 {
        self.skipped
    }

    #[must_use]
    pub fn xp_earned(&self) -> u32 {
        self.xp_earned
    }

    /// Ids answered wrong this session, in answer order.
    #[must_use]
    pub fn wrong_ids(&self) -> &[QuestionId] {
        &self.wrong_ids
    }

    /// Feedback for the current position while in `Answered`.
    #[must_use]
    pub fn last_answer(&self) -> Option<&ScoredAnswer> {
        self.last_answer.as_ref()
    }

    /// The question at the cursor, while one is being shown or reviewed.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        match self.state {
            SessionState::InQuestion | SessionState::Answered => self.deck.get(self.index),
            SessionState::Idle | SessionState::Finished => None,
        }
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress::new(self)
    }

    /// Score `selected` against the current question without changing state.
    ///
    /// Returns `None` outside `InQuestion` or for an option index that does
    /// not exist.
    #[must_use]
    pub fn evaluate(&self, selected: usize) -> Option<ScoredAnswer> {
        if self.state != SessionState::InQuestion {
            debug!(state = ?self.state, "answer ignored outside of a question");
            return None;
        }
        if selected >= OPTION_COUNT {
            debug!(selected, "answer ignored, option does not exist");
            return None;
        }
        let question = self.deck.get(self.index)?;
        let is_correct = question.is_correct(selected);
        Some(ScoredAnswer {
            position: self.index,
            question_id: question.id().clone(),
            selected,
            correct_index: question.answer_index(),
            is_correct,
            xp: xp_for_answer(question.difficulty(), is_correct),
        })
    }

    /// Commit an answer produced by [`QuizSession::evaluate`].
    ///
    /// Refuses (returns `false`) unless the session is still waiting on the
    /// very question the answer was scored for.
    pub fn apply(&mut self, scored: &ScoredAnswer) -> bool {
        let matches_current = self.state == SessionState::InQuestion
            && scored.position == self.index
            && self
                .deck
                .get(self.index)
                .is_some_and(|q| q.id() == &scored.question_id);
        if !matches_current {
            return false;
        }

        if scored.is_correct {
            self.correct += 1;
        } else {
            self.wrong += 1;
            self.wrong_ids.push(scored.question_id.clone());
        }
        self.xp_earned = self.xp_earned.saturating_add(scored.xp);
        self.last_answer = Some(scored.clone());
        self.state = SessionState::Answered;
        true
    }

    /// Evaluate and apply in one step.
    pub fn submit_answer(&mut self, selected: usize) -> Option<ScoredAnswer> {
        let scored = self.evaluate(selected)?;
        self.apply(&scored).then_some(scored)
    }

    /// Skip the current question instead of answering it.
    pub fn skip(&mut self) -> bool {
        if self.state != SessionState::InQuestion {
            debug!(state = ?self.state, "skip ignored");
            return false;
        }
        self.skipped += 1;
        self.advance();
        true
    }

    /// Move on after viewing feedback.
    pub fn next(&mut self) -> bool {
        if self.state != SessionState::Answered {
            debug!(state = ?self.state, "next ignored");
            return false;
        }
        self.advance();
        true
    }

    /// Stop now and keep whatever was scored so far.
    pub fn end(&mut self) {
        self.last_answer = None;
        self.state = SessionState::Finished;
    }

    fn advance(&mut self) {
        self.last_answer = None;
        self.index += 1;
        self.state = if self.index >= self.deck.len() {
            SessionState::Finished
        } else {
            SessionState::InQuestion
        };
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("state", &self.state)
            .field("deck_len", &self.deck.len())
            .field("index", &self.index)
            .field("correct", &self.correct)
            .field("wrong", &self.wrong)
            .field("skipped", &self.skipped)
            .field("xp_earned", &self.xp_earned)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
