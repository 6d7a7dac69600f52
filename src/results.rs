use crate::error::{IngestError, ValidationError};
use crate::store::ResultStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::{info, warn};

/// Longest language tag a result may carry
pub const MAX_LANGUAGE_CHARS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Keystroke breakdown of one test
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharCounts {
    pub total: u32,
    pub correct: u32,
    pub incorrect: u32,
    pub extra: u32,
    pub missed: u32,
}

/// Practice modifiers that were switched on during the test
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    pub caps: bool,
    pub accents: bool,
    pub punctuation: bool,
    pub hard_mode: bool,
}

/// One completed practice session; immutable once recorded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    pub user_id: UserId,
    pub wpm: u32,
    pub raw_wpm: u32,
    pub accuracy: u32,
    pub duration_seconds: u32,
    pub chars: CharCounts,
    pub language: Option<String>,
    pub flags: FeatureFlags,
    pub created_at: DateTime<Utc>,
}

/// Inbound result payload after type coercion, before range checks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultPayload {
    pub wpm: i64,
    pub raw_wpm: i64,
    pub accuracy: i64,
    pub duration: i64,
    pub chars: i64,
    pub correct_chars: i64,
    pub incorrect_chars: i64,
    pub extra_chars: i64,
    pub missed_chars: i64,
    pub language: Option<String>,
    pub caps_enabled: bool,
    pub accents_enabled: bool,
    pub punctuation_enabled: bool,
    pub hard_mode_enabled: bool,
}

impl ResultPayload {
    pub fn from_json(body: &str) -> Result<Self, ValidationError> {
        let value: Value =
            serde_json::from_str(body).map_err(|e| ValidationError::Malformed(e.to_string()))?;
        Self::from_value(value)
    }

    /// Coerce the camelCase JSON body the client posts after a test
    pub fn from_value(value: Value) -> Result<Self, ValidationError> {
        let Value::Object(map) = value else {
            return Err(ValidationError::Malformed(
                "expected a JSON object".to_string(),
            ));
        };

        Ok(Self {
            wpm: int_field(&map, "wpm")?,
            raw_wpm: int_field(&map, "rawWpm")?,
            accuracy: int_field(&map, "accuracy")?,
            duration: int_field(&map, "duration")?,
            chars: int_field(&map, "chars")?,
            correct_chars: int_field(&map, "correctChars")?,
            incorrect_chars: int_field(&map, "incorrectChars")?,
            extra_chars: int_field(&map, "extraChars")?,
            missed_chars: int_field(&map, "missedChars")?,
            language: language_field(&map, "language")?,
            caps_enabled: flag_field(&map, "capsEnabled"),
            accents_enabled: flag_field(&map, "accentsEnabled"),
            punctuation_enabled: flag_field(&map, "punctuationEnabled"),
            hard_mode_enabled: flag_field(&map, "hardModeEnabled"),
        })
    }

    /// Reject a non-positive duration, silently clamp everything else into range
    pub fn validate(
        &self,
        user_id: UserId,
        created_at: DateTime<Utc>,
    ) -> Result<TestResult, ValidationError> {
        if self.duration <= 0 {
            return Err(ValidationError::NonPositiveDuration(self.duration));
        }

        Ok(TestResult {
            user_id,
            wpm: clamp_count(self.wpm),
            raw_wpm: clamp_count(self.raw_wpm),
            accuracy: clamp_count(self.accuracy.min(100)),
            duration_seconds: clamp_count(self.duration),
            chars: CharCounts {
                total: clamp_count(self.chars),
                correct: clamp_count(self.correct_chars),
                incorrect: clamp_count(self.incorrect_chars),
                extra: clamp_count(self.extra_chars),
                missed: clamp_count(self.missed_chars),
            },
            language: self.language.clone(),
            flags: FeatureFlags {
                caps: self.caps_enabled,
                accents: self.accents_enabled,
                punctuation: self.punctuation_enabled,
                hard_mode: self.hard_mode_enabled,
            },
            created_at,
        })
    }
}

/// Validate a payload and append it to the user's history
///
/// Validation failures return before the store is touched.
pub fn ingest<S: ResultStore + ?Sized>(
    store: &S,
    user_id: UserId,
    payload: &ResultPayload,
) -> Result<i64, IngestError> {
    let result = payload.validate(user_id, Utc::now()).map_err(|e| {
        warn!(%user_id, error = %e, "rejected test result");
        e
    })?;

    let id = store.insert_result(&result)?;
    info!(%user_id, id, wpm = result.wpm, accuracy = result.accuracy, "recorded test result");
    Ok(id)
}

fn clamp_count(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

fn int_field(map: &Map<String, Value>, field: &'static str) -> Result<i64, ValidationError> {
    let invalid = |reason: String| ValidationError::InvalidField { field, reason };

    match map.get(field) {
        None => Ok(0),
        Some(Value::Null) => Err(invalid("expected an integer, got null".to_string())),
        Some(Value::Bool(b)) => Ok(i64::from(*b)),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else if let Some(f) = n.as_f64() {
                // Saturating cast truncates toward zero
                Ok(f.trunc() as i64)
            } else {
                Err(invalid(format!("{n} is out of range")))
            }
        }
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| invalid(format!("{s:?} is not an integer"))),
        Some(other) => Err(invalid(format!("expected an integer, got {other}"))),
    }
}

fn flag_field(map: &Map<String, Value>, field: &str) -> bool {
    match map.get(field) {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

fn language_field(
    map: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, ValidationError> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let tag = s.trim();
            if tag.is_empty() {
                Ok(None)
            } else if tag.chars().count() > MAX_LANGUAGE_CHARS {
                Err(ValidationError::InvalidField {
                    field,
                    reason: format!("longer than {MAX_LANGUAGE_CHARS} characters"),
                })
            } else {
                Ok(Some(tag.to_string()))
            }
        }
        Some(other) => Err(ValidationError::InvalidField {
            field,
            reason: format!("expected a string, got {other}"),
        }),
    }
}
