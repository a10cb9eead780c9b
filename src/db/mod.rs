//! Check-in persistence.
//!
//! [`CheckinRepository`] is the seam between the check-in service and storage.
//! Implementations must reject a second row for the same `(user_id, checkin_day)`
//! atomically and report it as [`StoreError::DuplicateDay`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::checkin::{CheckinRecord, NewCheckin};

pub mod memory;
pub mod pool;
pub mod postgres;

pub use memory::MemoryCheckinRepository;
pub use pool::create_pool;
pub use postgres::PgCheckinRepository;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("a check-in already exists for this user and day")]
    DuplicateDay,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait CheckinRepository: Send + Sync {
    /// Any record of `user_id` with `start <= date < end`.
    async fn find_in_window(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<CheckinRecord>, StoreError>;

    async fn insert(&self, checkin: NewCheckin) -> Result<CheckinRecord, StoreError>;

    /// Newest first.
    async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
        skip: i64,
    ) -> Result<Vec<CheckinRecord>, StoreError>;

    async fn count_for_user(&self, user_id: Uuid) -> Result<i64, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
