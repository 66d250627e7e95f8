mod bank;
mod filter;
mod ids;
mod question;
mod stats;

pub use bank::{BankError, QuestionBank};
pub use filter::{
    DifficultyFilter, FilterParseError, QuizFilters, QuizMode, TopicFilter, WILDCARD,
};
pub use ids::{ParseIdError, QuestionId};
pub use question::{
    Difficulty, OPTION_COUNT, Paper, Question, QuestionDraft, QuestionError, option_letter,
};
pub use stats::{Profile, QuestionStats, QuestionStatsMap, StatsExport};
