//! PostgreSQL reminder log repository implementation

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbResult;
use crate::repo::ReminderLogRepository;

/// PostgreSQL reminder log repository
#[derive(Clone)]
pub struct PgReminderLogRepository {
    pool: PgPool,
}

impl PgReminderLogRepository {
    /// Create a new reminder log repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReminderLogRepository for PgReminderLogRepository {
    async fn record(
        &self,
        subscription_id: Uuid,
        cycle_date: NaiveDate,
        sent_at: DateTime<Utc>,
    ) -> DbResult<bool> {
        // Primary key (subscription_id, cycle_date) makes re-recording a no-op.
        let result = sqlx::query(
            r#"
            INSERT INTO reminder_log (subscription_id, cycle_date, sent_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (subscription_id, cycle_date) DO NOTHING
            "#,
        )
        .bind(subscription_id)
        .bind(cycle_date)
        .bind(sent_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn exists(&self, subscription_id: Uuid, cycle_date: NaiveDate) -> DbResult<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM reminder_log \
             WHERE subscription_id = $1 AND cycle_date = $2)",
        )
        .bind(subscription_id)
        .bind(cycle_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn count_sent_since(&self, since: DateTime<Utc>) -> DbResult<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM reminder_log WHERE sent_at >= $1")
                .bind(since)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}
