use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique, stable identifier for a question in the bank.
///
/// Question banks in the wild use both string (`"q-12"`) and numeric (`12`)
/// identifiers. Both decode into the same textual form so stats keyed by id
/// survive either representation.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct QuestionId(String);

impl QuestionId {
    /// Creates a new `QuestionId`
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the underlying identifier text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the identifier is blank after trimming.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl<'de> Deserialize<'de> for QuestionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Unsigned(u64),
            Signed(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => Self(s),
            RawId::Unsigned(n) => Self(n.to_string()),
            RawId::Signed(n) => Self(n.to_string()),
        })
    }
}

impl fmt::Debug for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuestionId({})", self.0)
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for QuestionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl FromStr for QuestionId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseIdError {
                kind: "QuestionId".to_string(),
            });
        }
        Ok(Self::new(trimmed))
    }
}

/// Error type for parsing ID from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_id_display() {
        let id = QuestionId::new("alg-7");
        assert_eq!(id.to_string(), "alg-7");
    }

    #[test]
    fn test_question_id_from_str_trims() {
        let id: QuestionId = "  calc-1 ".parse().unwrap();
        assert_eq!(id, QuestionId::new("calc-1"));
    }

    #[test]
    fn test_question_id_from_str_blank() {
        let result = "   ".parse::<QuestionId>();
        assert!(result.is_err());
    }

    #[test]
    fn test_question_id_decodes_numbers_and_strings() {
        let ids: Vec<QuestionId> = serde_json::from_str(r#"["q1", 42, -3]"#).unwrap();
        assert_eq!(
            ids,
            vec![
                QuestionId::new("q1"),
                QuestionId::new("42"),
                QuestionId::new("-3")
            ]
        );
    }

    #[test]
    fn test_question_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&QuestionId::new("42")).unwrap();
        assert_eq!(json, r#""42""#);
    }
}
