use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Stored row. `journal_cipher` never leaves the server as-is.
#[derive(Debug, Clone, FromRow)]
pub struct CheckinRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: DateTime<Utc>,
    pub checkin_day: NaiveDate,
    pub mood_rating: i32,
    pub stress_level: StressLevel,
    pub journal_cipher: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "stress_level")]
pub enum StressLevel {
    Low,
    Medium,
    High,
}

impl StressLevel {
    pub const ALL: [StressLevel; 3] = [StressLevel::Low, StressLevel::Medium, StressLevel::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            StressLevel::Low => "Low",
            StressLevel::Medium => "Medium",
            StressLevel::High => "High",
        }
    }
}

impl std::str::FromStr for StressLevel {
    type Err = ();

    /// Exact, case-sensitive match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StressLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or(())
    }
}

/// Row about to be inserted; the journal is already encrypted.
#[derive(Debug, Clone)]
pub struct NewCheckin {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: DateTime<Utc>,
    pub checkin_day: NaiveDate,
    pub mood_rating: i32,
    pub stress_level: StressLevel,
    pub journal_cipher: String,
}

/// Public projection returned after a successful create.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckinSummary {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub mood_rating: i32,
    pub stress_level: StressLevel,
}

impl From<&CheckinRecord> for CheckinSummary {
    fn from(record: &CheckinRecord) -> Self {
        Self {
            id: record.id,
            date: record.date,
            mood_rating: record.mood_rating,
            stress_level: record.stress_level,
        }
    }
}

/// History item with the journal decrypted.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckinEntry {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub mood_rating: i32,
    pub stress_level: StressLevel,
    pub journal_entry: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedCheckinResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub checkin: CheckinSummary,
}

#[derive(Debug, Serialize)]
pub struct CheckinPage {
    pub checkins: Vec<CheckinEntry>,
    pub total: i64,
}

#[derive(Debug, Deserialize)]
pub struct CheckinQuery {
    pub limit: Option<i64>,
    pub skip: Option<i64>,
}
