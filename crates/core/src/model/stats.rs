use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::model::ids::QuestionId;

/// Per-question performance counters, keyed by question id in the store.
pub type QuestionStatsMap = BTreeMap<QuestionId, QuestionStats>;

/// Decode `T` from a JSON object only.
///
/// Derived struct decoding also accepts positional arrays, which would let
/// `[1, 2, 3]` pass as a record.
fn from_object<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let map = Map::<String, Value>::deserialize(deserializer)?;
    serde_json::from_value(Value::Object(map)).map_err(D::Error::custom)
}

//
// ─── QUESTION STATS ────────────────────────────────────────────────────────────
//

/// Performance counters for a single question.
///
/// Every recorded attempt bumps `attempts` and exactly one of
/// `correct`/`wrong`, so `correct + wrong == attempts` holds for records
/// produced by [`QuestionStats::record_attempt`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionStats {
    pub attempts: u32,
    pub correct: u32,
    pub wrong: u32,
    pub last_seen: Option<DateTime<Utc>>,
    pub last_correct: Option<DateTime<Utc>>,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct QuestionStatsRecord {
    attempts: u32,
    correct: u32,
    wrong: u32,
    last_seen: Option<DateTime<Utc>>,
    last_correct: Option<DateTime<Utc>>,
}

impl<'de> Deserialize<'de> for QuestionStats {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record: QuestionStatsRecord = from_object(deserializer)?;
        Ok(Self {
            attempts: record.attempts,
            correct: record.correct,
            wrong: record.wrong,
            last_seen: record.last_seen,
            last_correct: record.last_correct,
        })
    }
}

impl QuestionStats {
    /// Apply one scored attempt.
    ///
    /// `last_correct` keeps its previous value on a wrong answer.
    pub fn record_attempt(&mut self, is_correct: bool, at: DateTime<Utc>) {
        self.attempts = self.attempts.saturating_add(1);
        if is_correct {
            self.correct = self.correct.saturating_add(1);
            self.last_correct = Some(at);
        } else {
            self.wrong = self.wrong.saturating_add(1);
        }
        self.last_seen = Some(at);
    }

    /// Wrong more often than right (and wrong at least once).
    #[must_use]
    pub fn is_net_negative(&self) -> bool {
        self.wrong > 0 && self.correct < self.wrong
    }
}

//
// ─── PROFILE ───────────────────────────────────────────────────────────────────
//

/// Aggregate learner profile.
///
/// Fields missing from a stored record decode as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub xp: u64,
    pub streak: u32,
    pub total_answered: u32,
    pub total_correct: u32,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ProfileRecord {
    xp: u64,
    streak: u32,
    total_answered: u32,
    total_correct: u32,
}

impl<'de> Deserialize<'de> for Profile {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record: ProfileRecord = from_object(deserializer)?;
        Ok(Self {
            xp: record.xp,
            streak: record.streak,
            total_answered: record.total_answered,
            total_correct: record.total_correct,
        })
    }
}

impl Profile {
    /// Returns the profile after one scored attempt.
    #[must_use]
    pub fn apply_attempt(self, is_correct: bool, gained_xp: u32) -> Self {
        let mut next = self;
        next.xp = next.xp.saturating_add(u64::from(gained_xp));
        next.total_answered = next.total_answered.saturating_add(1);
        if is_correct {
            next.total_correct = next.total_correct.saturating_add(1);
            next.streak = next.streak.saturating_add(1);
        } else {
            next.streak = 0;
        }
        next
    }

    /// Lifetime accuracy in percent, or `None` before the first answer.
    #[must_use]
    pub fn accuracy_percent(&self) -> Option<f64> {
        if self.total_answered == 0 {
            return None;
        }
        Some(f64::from(self.total_correct) / f64::from(self.total_answered) * 100.0)
    }
}

//
// ─── EXPORT ────────────────────────────────────────────────────────────────────
//

/// Both stats records, verbatim, as exchanged by export/import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsExport {
    pub stats: QuestionStatsMap,
    pub profile: Profile,
}
