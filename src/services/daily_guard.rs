//! Once-per-day rule for check-ins.
//!
//! A calendar day is `[midnight, next midnight)` at a fixed UTC offset taken
//! from configuration (UTC by default), never the server's local zone.
//! The lookup here gives callers a clean error on the common path; the
//! repository's unique `(user_id, checkin_day)` constraint is what actually
//! holds the rule under concurrent submissions.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use uuid::Uuid;

use crate::db::CheckinRepository;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub day: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
pub struct DailyUniquenessGuard {
    offset: FixedOffset,
}

impl Default for DailyUniquenessGuard {
    fn default() -> Self {
        Self::utc()
    }
}

impl DailyUniquenessGuard {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    pub fn window(&self, now: DateTime<Utc>) -> DayWindow {
        let day = now.with_timezone(&self.offset).date_naive();
        let local_midnight = day.and_time(NaiveTime::MIN);
        let utc_midnight =
            local_midnight - Duration::seconds(i64::from(self.offset.local_minus_utc()));
        let start = Utc.from_utc_datetime(&utc_midnight);

        DayWindow {
            day,
            start,
            end: start + Duration::days(1),
        }
    }

    /// Fails with [`AppError::DuplicateCheckin`] if the user already has a
    /// record in today's window, whatever its contents.
    pub async fn ensure_first_today(
        &self,
        repo: &dyn CheckinRepository,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<DayWindow> {
        let window = self.window(now);

        if let Some(existing) = repo.find_in_window(user_id, window.start, window.end).await? {
            tracing::info!(
                user_id = %user_id,
                existing_id = %existing.id,
                day = %window.day,
                "Rejected second check-in for the day"
            );
            return Err(AppError::DuplicateCheckin);
        }

        Ok(window)
    }
}
