use super::engine::{QuizSession, SessionState};

/// Aggregated view of quiz progress, useful for UI.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionProgress {
    /// 1-based number of the question on screen, if any.
    pub position: Option<usize>,
    pub total: usize,
    pub answered: u32,
    pub skipped: u32,
    pub remaining: usize,
    /// Share of the deck already behind the cursor, 0 to 100.
    pub percent_complete: f64,
    pub is_complete: bool,
}

impl SessionProgress {
    pub(crate) fn new(session: &QuizSession) -> Self {
        let total = session.deck().len();
        let passed = session.index().min(total);
        let on_question = matches!(
            session.state(),
            SessionState::InQuestion | SessionState::Answered
        );

        #[allow(clippy::cast_precision_loss)]
        let percent_complete = if total == 0 {
            0.0
        } else {
            passed as f64 / total as f64 * 100.0
        };

        Self {
            position: on_question.then_some(passed + 1),
            total,
            answered: session.correct() + session.wrong(),
            skipped: session.skipped(),
            remaining: total - passed,
            percent_complete,
            is_complete: session.is_finished(),
        }
    }
}
