use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::ids::QuestionId;

/// Number of answer options every question carries.
pub const OPTION_COUNT: usize = 4;

const OPTION_LETTERS: [char; OPTION_COUNT] = ['A', 'B', 'C', 'D'];

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question id cannot be empty")]
    EmptyId,

    #[error("question {id}: topic cannot be empty")]
    EmptyTopic { id: QuestionId },

    #[error("question {id}: body cannot be empty")]
    EmptyBody { id: QuestionId },

    #[error("difficulty must be between 1 and 4, got {0}")]
    InvalidDifficulty(u8),

    #[error("question {id}: expected 4 options, got {count}")]
    OptionCount { id: QuestionId, count: usize },

    #[error("question {id}: answer index {index} is out of range")]
    AnswerOutOfRange { id: QuestionId, index: usize },
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

/// Ordinal difficulty, 1 (easiest) to 4 (hardest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Difficulty(u8);

impl Difficulty {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 4;

    /// Creates a validated difficulty.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::InvalidDifficulty` outside `1..=4`.
    pub fn new(value: u8) -> Result<Self, QuestionError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(QuestionError::InvalidDifficulty(value))
        }
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = QuestionError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Difficulty> for u8 {
    fn from(value: Difficulty) -> Self {
        value.0
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//
// ─── PAPER ─────────────────────────────────────────────────────────────────────
//

/// Which exam paper a question belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Paper {
    Paper1,
    Paper2,
    Both,
}

impl Paper {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Paper::Paper1 => "paper1",
            Paper::Paper2 => "paper2",
            Paper::Both => "both",
        }
    }

    /// True when a question with this affinity belongs on `paper`.
    #[must_use]
    pub fn covers(self, paper: Paper) -> bool {
        self == Paper::Both || self == paper
    }
}

impl fmt::Display for Paper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Letter shown next to the option at `index` (`A`..`D`).
#[must_use]
pub fn option_letter(index: usize) -> Option<char> {
    OPTION_LETTERS.get(index).copied()
}

//
// ─── QUESTION TYPES ────────────────────────────────────────────────────────────
//

/// Raw question record as it appears in a question bank document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    pub id: QuestionId,
    pub topic: String,
    pub difficulty: u8,
    pub paper: Paper,
    pub question: String,
    pub options: Vec<String>,
    pub answer_index: usize,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl QuestionDraft {
    /// Validate the raw record into an immutable `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the id, topic or body is blank, the
    /// difficulty is out of range, the record does not carry exactly four
    /// options, or the answer index does not point at one of them.
    pub fn validate(self) -> Result<Question, QuestionError> {
        if self.id.is_blank() {
            return Err(QuestionError::EmptyId);
        }
        let topic = self.topic.trim().to_string();
        if topic.is_empty() {
            return Err(QuestionError::EmptyTopic { id: self.id });
        }
        if self.question.trim().is_empty() {
            return Err(QuestionError::EmptyBody { id: self.id });
        }
        let difficulty = Difficulty::new(self.difficulty)?;

        let options: [String; OPTION_COUNT] =
            self.options
                .try_into()
                .map_err(|rejected: Vec<String>| QuestionError::OptionCount {
                    id: self.id.clone(),
                    count: rejected.len(),
                })?;

        if self.answer_index >= OPTION_COUNT {
            return Err(QuestionError::AnswerOutOfRange {
                id: self.id,
                index: self.answer_index,
            });
        }

        let explanation = self
            .explanation
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());

        Ok(Question {
            id: self.id,
            topic,
            difficulty,
            paper: self.paper,
            body: self.question,
            options,
            answer_index: self.answer_index,
            explanation,
        })
    }
}

/// A validated, immutable multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    topic: String,
    difficulty: Difficulty,
    paper: Paper,
    body: String,
    options: [String; OPTION_COUNT],
    answer_index: usize,
    explanation: Option<String>,
}

impl Question {
    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn paper(&self) -> Paper {
        self.paper
    }

    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    #[must_use]
    pub fn options(&self) -> &[String; OPTION_COUNT] {
        &self.options
    }

    #[must_use]
    pub fn answer_index(&self) -> usize {
        self.answer_index
    }

    /// Letter of the correct option.
    #[must_use]
    pub fn answer_letter(&self) -> char {
        OPTION_LETTERS[self.answer_index]
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    #[must_use]
    pub fn is_correct(&self, selected: usize) -> bool {
        selected == self.answer_index
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
