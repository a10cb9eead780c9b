//! Field-level validation of check-in submissions.
//!
//! Fields are taken as raw JSON values so that a wrong type (`"moodRating": "8"`)
//! is reported against the field itself instead of failing the whole body.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::checkin::StressLevel;

pub const MOOD_RATING_MESSAGE: &str = "Mood rating must be between 1 and 10";
pub const STRESS_LEVEL_MESSAGE: &str = "Invalid stress level";
pub const JOURNAL_ENTRY_MESSAGE: &str = "Journal entry is required";

/// Validator key and JSON name for each field, in response order.
const FIELDS: [(&str, &str); 3] = [
    ("mood_rating", "moodRating"),
    ("stress_level", "stressLevel"),
    ("journal_entry", "journalEntry"),
];

/// POST /api/checkins
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckinRequest {
    #[validate(required(message = "Mood rating must be between 1 and 10"), custom = "validate_mood_rating")]
    pub mood_rating: Option<Value>,

    #[validate(required(message = "Invalid stress level"), custom = "validate_stress_level")]
    pub stress_level: Option<Value>,

    #[validate(required(message = "Journal entry is required"), custom = "validate_journal_entry")]
    pub journal_entry: Option<Value>,
}

/// A submission that passed validation. The journal is already trimmed.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckinSubmission {
    pub mood_rating: i32,
    pub stress_level: StressLevel,
    pub journal_entry: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldError {
    pub field: Option<String>,
    pub code: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: Option<&str>, code: &str, message: &str) -> Self {
        Self {
            field: field.map(str::to_string),
            code: code.to_string(),
            message: message.to_string(),
        }
    }
}

pub fn validate_submission(req: &CreateCheckinRequest) -> Result<CheckinSubmission, Vec<FieldError>> {
    req.validate().map_err(|errors| to_field_errors(&errors))?;

    let mood_rating = req.mood_rating.as_ref().and_then(mood_rating_value);
    let stress_level = req.stress_level.as_ref().and_then(stress_level_value);
    let journal_entry = req.journal_entry.as_ref().and_then(journal_entry_value);

    match (mood_rating, stress_level, journal_entry) {
        (Some(mood_rating), Some(stress_level), Some(journal_entry)) => Ok(CheckinSubmission {
            mood_rating,
            stress_level,
            journal_entry,
        }),
        _ => Err(vec![FieldError::new(Some("body"), "invalid", "Invalid check-in submission")]),
    }
}

fn mood_rating_value(value: &Value) -> Option<i32> {
    value
        .as_i64()
        .filter(|mood| (1..=10).contains(mood))
        .map(|mood| mood as i32)
}

fn stress_level_value(value: &Value) -> Option<StressLevel> {
    value.as_str().and_then(|s| s.parse().ok())
}

fn journal_entry_value(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

fn validate_mood_rating(value: &Value) -> Result<(), ValidationError> {
    mood_rating_value(value)
        .map(|_| ())
        .ok_or_else(|| invalid("range", MOOD_RATING_MESSAGE))
}

fn validate_stress_level(value: &Value) -> Result<(), ValidationError> {
    stress_level_value(value)
        .map(|_| ())
        .ok_or_else(|| invalid("one_of", STRESS_LEVEL_MESSAGE))
}

fn validate_journal_entry(value: &Value) -> Result<(), ValidationError> {
    journal_entry_value(value)
        .map(|_| ())
        .ok_or_else(|| invalid("blank", JOURNAL_ENTRY_MESSAGE))
}

/// Flatten validator output into one entry per failing field, in field order.
fn to_field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let by_field = errors.field_errors();

    FIELDS
        .iter()
        .filter_map(|(key, json_name)| {
            let found = by_field.get(key).or_else(|| by_field.get(json_name))?;
            let first = found.first()?;
            let message = first
                .message
                .as_deref()
                .unwrap_or("Invalid value");
            Some(FieldError::new(Some(*json_name), &first.code, message))
        })
        .collect()
}
