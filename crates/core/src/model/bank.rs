use std::collections::{BTreeSet, HashMap};

use thiserror::Error;

use crate::model::ids::QuestionId;
use crate::model::question::{Question, QuestionDraft, QuestionError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BankError {
    #[error("question bank is not a valid list of questions: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("question #{position} is invalid: {source}")]
    InvalidQuestion {
        position: usize,
        #[source]
        source: QuestionError,
    },

    #[error("duplicate question id: {0}")]
    DuplicateId(QuestionId),
}

/// Immutable, ordered collection of questions loaded once at startup.
///
/// Order is preserved from the source document; the results review list is
/// reported in this order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionBank {
    questions: Vec<Question>,
    by_id: HashMap<QuestionId, usize>,
}

impl QuestionBank {
    /// Build a bank from already-validated questions.
    ///
    /// # Errors
    ///
    /// Returns `BankError::DuplicateId` if two questions share an identifier.
    pub fn new(questions: Vec<Question>) -> Result<Self, BankError> {
        let mut by_id = HashMap::with_capacity(questions.len());
        for (position, question) in questions.iter().enumerate() {
            if by_id.insert(question.id().clone(), position).is_some() {
                return Err(BankError::DuplicateId(question.id().clone()));
            }
        }
        Ok(Self { questions, by_id })
    }

    /// Validate a list of raw records into a bank.
    ///
    /// # Errors
    ///
    /// Returns the first invalid record (by position) or duplicate id.
    pub fn from_drafts(drafts: Vec<QuestionDraft>) -> Result<Self, BankError> {
        let questions = drafts
            .into_iter()
            .enumerate()
            .map(|(position, draft)| {
                draft
                    .validate()
                    .map_err(|source| BankError::InvalidQuestion { position, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(questions)
    }

    /// Parse a JSON array of question records.
    ///
    /// # Errors
    ///
    /// Returns `BankError::Malformed` if the document does not decode, or any
    /// validation error from [`QuestionBank::from_drafts`].
    pub fn from_json(raw: &str) -> Result<Self, BankError> {
        let drafts: Vec<QuestionDraft> = serde_json::from_str(raw)?;
        Self::from_drafts(drafts)
    }

    #[must_use]
    pub fn get(&self, id: &QuestionId) -> Option<&Question> {
        self.by_id.get(id).map(|&pos| &self.questions[pos])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Distinct topics, sorted.
    #[must_use]
    pub fn topics(&self) -> Vec<&str> {
        self.questions
            .iter()
            .map(Question::topic)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
