mod engine;
mod plan;
mod progress;
mod results;
mod workflow;

// Public API of the quiz session subsystem.
pub use crate::error::SessionError;
pub use engine::{QuizSession, ScoredAnswer, SessionState};
pub use plan::{DeckBuilder, DeckPlan};
pub use progress::SessionProgress;
pub use results::{QuizResults, Review, ReviewItem};
pub use workflow::{AnswerResult, DEFAULT_QUIZ_SIZE, QuizLoopService, QuizRequest, QuizStart};
