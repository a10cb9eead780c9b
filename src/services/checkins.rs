use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::crypto::{self, JournalKey};
use crate::db::CheckinRepository;
use crate::error::{AppError, AppResult};
use crate::models::checkin::{
    CheckinEntry, CheckinPage, CheckinQuery, CheckinSummary, NewCheckin,
};
use crate::services::daily_guard::DailyUniquenessGuard;
use crate::validation::{validate_submission, CreateCheckinRequest};

pub const DEFAULT_PAGE_LIMIT: i64 = 30;
pub const MAX_PAGE_LIMIT: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: i64,
    pub skip: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            skip: 0,
        }
    }
}

impl From<&CheckinQuery> for PageRequest {
    fn from(query: &CheckinQuery) -> Self {
        Self {
            limit: query
                .limit
                .unwrap_or(DEFAULT_PAGE_LIMIT)
                .clamp(1, MAX_PAGE_LIMIT),
            skip: query.skip.unwrap_or(0).max(0),
        }
    }
}

/// Creates and reads check-ins. Journals are encrypted before they reach the
/// repository and decrypted on the way out.
#[derive(Clone)]
pub struct CheckinService {
    repo: Arc<dyn CheckinRepository>,
    key: Arc<JournalKey>,
    guard: DailyUniquenessGuard,
}

impl CheckinService {
    pub fn new(
        repo: Arc<dyn CheckinRepository>,
        key: Arc<JournalKey>,
        guard: DailyUniquenessGuard,
    ) -> Self {
        Self { repo, key, guard }
    }

    pub fn repository(&self) -> &dyn CheckinRepository {
        self.repo.as_ref()
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        req: &CreateCheckinRequest,
        now: DateTime<Utc>,
    ) -> AppResult<CheckinSummary> {
        let submission = validate_submission(req).map_err(AppError::Validation)?;

        let window = self
            .guard
            .ensure_first_today(self.repo.as_ref(), user_id, now)
            .await?;

        let journal_cipher = crypto::encrypt(&submission.journal_entry, &self.key).map_err(|e| {
            tracing::error!(user_id = %user_id, error = %e, "Journal failed to encrypt");
            AppError::from(e)
        })?;

        let record = self
            .repo
            .insert(NewCheckin {
                id: Uuid::new_v4(),
                user_id,
                date: now,
                checkin_day: window.day,
                mood_rating: submission.mood_rating,
                stress_level: submission.stress_level,
                journal_cipher,
            })
            .await?;

        tracing::info!(
            user_id = %user_id,
            checkin_id = %record.id,
            day = %record.checkin_day,
            "Check-in created"
        );

        Ok(CheckinSummary::from(&record))
    }

    pub async fn list(&self, user_id: Uuid, page: PageRequest) -> AppResult<CheckinPage> {
        let records = self
            .repo
            .list_for_user(user_id, page.limit, page.skip)
            .await?;
        let total = self.repo.count_for_user(user_id).await?;

        let mut checkins = Vec::with_capacity(records.len());
        for record in records {
            let journal_entry = crypto::decrypt(&record.journal_cipher, &self.key).map_err(|e| {
                tracing::error!(checkin_id = %record.id, error = %e, "Stored journal failed to decrypt");
                AppError::from(e)
            })?;

            checkins.push(CheckinEntry {
                id: record.id,
                date: record.date,
                mood_rating: record.mood_rating,
                stress_level: record.stress_level,
                journal_entry,
            });
        }

        Ok(CheckinPage { checkins, total })
    }
}
