use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::model::question::{Difficulty, Paper, Question};

/// Keyword accepted by the topic and difficulty filters to disable them.
pub const WILDCARD: &str = "all";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FilterParseError {
    #[error("topic filter cannot be empty")]
    EmptyTopic,

    #[error("invalid difficulty filter: {0} (expected 1-4 or \"all\")")]
    InvalidDifficulty(String),

    #[error("invalid quiz mode: {0} (expected mixed, paper1, paper2 or reviewWrong)")]
    InvalidMode(String),
}

//
// ─── TOPIC ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TopicFilter {
    #[default]
    All,
    Only(String),
}

impl TopicFilter {
    #[must_use]
    pub fn matches(&self, question: &Question) -> bool {
        match self {
            TopicFilter::All => true,
            TopicFilter::Only(topic) => question.topic() == topic,
        }
    }
}

impl FromStr for TopicFilter {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "" => Err(FilterParseError::EmptyTopic),
            WILDCARD => Ok(Self::All),
            topic => Ok(Self::Only(topic.to_string())),
        }
    }
}

impl fmt::Display for TopicFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopicFilter::All => f.write_str(WILDCARD),
            TopicFilter::Only(topic) => f.write_str(topic),
        }
    }
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DifficultyFilter {
    #[default]
    All,
    Only(Difficulty),
}

impl DifficultyFilter {
    #[must_use]
    pub fn matches(&self, question: &Question) -> bool {
        match self {
            DifficultyFilter::All => true,
            DifficultyFilter::Only(d) => question.difficulty() == *d,
        }
    }
}

impl FromStr for DifficultyFilter {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == WILDCARD {
            return Ok(Self::All);
        }
        s.parse::<u8>()
            .ok()
            .and_then(|v| Difficulty::new(v).ok())
            .map(Self::Only)
            .ok_or_else(|| FilterParseError::InvalidDifficulty(s.to_string()))
    }
}

impl fmt::Display for DifficultyFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DifficultyFilter::All => f.write_str(WILDCARD),
            DifficultyFilter::Only(d) => write!(f, "{d}"),
        }
    }
}

//
// ─── MODE ──────────────────────────────────────────────────────────────────────
//

/// How the candidate pool is narrowed beyond topic and difficulty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QuizMode {
    /// No paper constraint.
    #[default]
    Mixed,
    Paper1,
    Paper2,
    /// Only questions answered wrong more often than right.
    ReviewWrong,
}

impl QuizMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuizMode::Mixed => "mixed",
            QuizMode::Paper1 => "paper1",
            QuizMode::Paper2 => "paper2",
            QuizMode::ReviewWrong => "reviewWrong",
        }
    }

    /// Paper constraint imposed by this mode, if any.
    #[must_use]
    pub fn paper(self) -> Option<Paper> {
        match self {
            QuizMode::Paper1 => Some(Paper::Paper1),
            QuizMode::Paper2 => Some(Paper::Paper2),
            QuizMode::Mixed | QuizMode::ReviewWrong => None,
        }
    }
}

impl FromStr for QuizMode {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "mixed" => Ok(Self::Mixed),
            "paper1" => Ok(Self::Paper1),
            "paper2" => Ok(Self::Paper2),
            "reviewWrong" => Ok(Self::ReviewWrong),
            other => Err(FilterParseError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for QuizMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── FILTERS ───────────────────────────────────────────────────────────────────
//

/// User-chosen selection criteria for a quiz.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizFilters {
    pub topic: TopicFilter,
    pub difficulty: DifficultyFilter,
    pub mode: QuizMode,
}

impl QuizFilters {
    #[must_use]
    pub fn new(topic: TopicFilter, difficulty: DifficultyFilter, mode: QuizMode) -> Self {
        Self {
            topic,
            difficulty,
            mode,
        }
    }

    /// Same topic and difficulty, different mode.
    #[must_use]
    pub fn with_mode(mut self, mode: QuizMode) -> Self {
        self.mode = mode;
        self
    }

    /// Topic, difficulty and paper checks. The review-wrong condition needs
    /// stats and is applied by the deck builder.
    #[must_use]
    pub fn matches_static(&self, question: &Question) -> bool {
        if !self.topic.matches(question) || !self.difficulty.matches(question) {
            return false;
        }
        match self.mode.paper() {
            Some(paper) => question.paper().covers(paper),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wildcards() {
        assert_eq!("all".parse::<TopicFilter>().unwrap(), TopicFilter::All);
        assert_eq!(
            "all".parse::<DifficultyFilter>().unwrap(),
            DifficultyFilter::All
        );
    }

    #[test]
    fn parses_concrete_values() {
        assert_eq!(
            " Vectors ".parse::<TopicFilter>().unwrap(),
            TopicFilter::Only("Vectors".into())
        );
        assert_eq!(
            "3".parse::<DifficultyFilter>().unwrap(),
            DifficultyFilter::Only(Difficulty::new(3).unwrap())
        );
        assert_eq!("reviewWrong".parse::<QuizMode>().unwrap(), QuizMode::ReviewWrong);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            "5".parse::<DifficultyFilter>(),
            Err(FilterParseError::InvalidDifficulty(_))
        ));
        assert!(matches!(
            "paper3".parse::<QuizMode>(),
            Err(FilterParseError::InvalidMode(_))
        ));
        assert_eq!("  ".parse::<TopicFilter>(), Err(FilterParseError::EmptyTopic));
    }

    #[test]
    fn display_round_trips_through_parse() {
        for mode in [
            QuizMode::Mixed,
            QuizMode::Paper1,
            QuizMode::Paper2,
            QuizMode::ReviewWrong,
        ] {
            assert_eq!(mode.to_string().parse::<QuizMode>().unwrap(), mode);
        }
    }

    #[test]
    fn with_mode_keeps_topic_and_difficulty() {
        let filters = QuizFilters::new(
            TopicFilter::Only("Algebra".into()),
            DifficultyFilter::Only(Difficulty::new(2).unwrap()),
            QuizMode::Paper1,
        )
        .with_mode(QuizMode::ReviewWrong);
        assert_eq!(filters.topic, TopicFilter::Only("Algebra".into()));
        assert_eq!(filters.mode, QuizMode::ReviewWrong);
    }
}
