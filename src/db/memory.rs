use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{CheckinRepository, StoreError};
use crate::models::checkin::{CheckinRecord, NewCheckin};

/// In-process store for tests and database-less local runs.
/// Check-and-insert happens under one lock, so the per-day rule holds under concurrency.
#[derive(Clone, Default)]
pub struct MemoryCheckinRepository {
    records: Arc<Mutex<Vec<CheckinRecord>>>,
}

impl MemoryCheckinRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CheckinRepository for MemoryCheckinRepository {
    async fn find_in_window(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<CheckinRecord>, StoreError> {
        let records = self.records.lock().await;
        Ok(records
            .iter()
            .find(|r| r.user_id == user_id && r.date >= start && r.date < end)
            .cloned())
    }

    async fn insert(&self, checkin: NewCheckin) -> Result<CheckinRecord, StoreError> {
        let mut records = self.records.lock().await;

        if records
            .iter()
            .any(|r| r.user_id == checkin.user_id && r.checkin_day == checkin.checkin_day)
        {
            return Err(StoreError::DuplicateDay);
        }

        let record = CheckinRecord {
            id: checkin.id,
            user_id: checkin.user_id,
            date: checkin.date,
            checkin_day: checkin.checkin_day,
            mood_rating: checkin.mood_rating,
            stress_level: checkin.stress_level,
            journal_cipher: checkin.journal_cipher,
            created_at: Utc::now(),
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
        skip: i64,
    ) -> Result<Vec<CheckinRecord>, StoreError> {
        let records = self.records.lock().await;

        let mut owned: Vec<CheckinRecord> = records
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));

        Ok(owned
            .into_iter()
            .skip(skip.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count_for_user(&self, user_id: Uuid) -> Result<i64, StoreError> {
        let records = self.records.lock().await;
        Ok(records.iter().filter(|r| r.user_id == user_id).count() as i64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
