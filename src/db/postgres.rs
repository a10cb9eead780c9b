use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{CheckinRepository, StoreError};
use crate::models::checkin::{CheckinRecord, NewCheckin};

const USER_DAY_CONSTRAINT: &str = "checkins_user_day_unique";

#[derive(Clone)]
pub struct PgCheckinRepository {
    db: PgPool,
}

impl PgCheckinRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.db).await
    }
}

#[async_trait]
impl CheckinRepository for PgCheckinRepository {
    async fn find_in_window(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<CheckinRecord>, StoreError> {
        let record = sqlx::query_as::<_, CheckinRecord>(
            r#"
            SELECT * FROM checkins
            WHERE user_id = $1 AND date >= $2 AND date < $3
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_optional(&self.db)
        .await?;

        Ok(record)
    }

    async fn insert(&self, checkin: NewCheckin) -> Result<CheckinRecord, StoreError> {
        // USER_DAY_CONSTRAINT is the authoritative once-per-day guard.
        let result = sqlx::query_as::<_, CheckinRecord>(
            r#"
            INSERT INTO checkins (id, user_id, date, checkin_day, mood_rating, stress_level, journal_cipher, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            RETURNING *
            "#,
        )
        .bind(checkin.id)
        .bind(checkin.user_id)
        .bind(checkin.date)
        .bind(checkin.checkin_day)
        .bind(checkin.mood_rating)
        .bind(checkin.stress_level)
        .bind(&checkin.journal_cipher)
        .fetch_one(&self.db)
        .await;

        match result {
            Ok(record) => Ok(record),
            Err(sqlx::Error::Database(db_err))
                if db_err.is_unique_violation()
                    && db_err.constraint() == Some(USER_DAY_CONSTRAINT) =>
            {
                Err(StoreError::DuplicateDay)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
        skip: i64,
    ) -> Result<Vec<CheckinRecord>, StoreError> {
        let records = sqlx::query_as::<_, CheckinRecord>(
            r#"
            SELECT * FROM checkins
            WHERE user_id = $1
            ORDER BY date DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.db)
        .await?;

        Ok(records)
    }

    async fn count_for_user(&self, user_id: Uuid) -> Result<i64, StoreError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM checkins WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.db)
            .await?;

        Ok(total)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.db)
            .await?;
        Ok(())
    }
}
