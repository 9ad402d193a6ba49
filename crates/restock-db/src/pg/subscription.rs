//! PostgreSQL subscription repository implementation

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::{StateCounts, SubscriptionRow};
use crate::repo::{CreateSubscription, SubscriptionRepository};

/// PostgreSQL subscription repository
#[derive(Clone)]
pub struct PgSubscriptionRepository {
    pool: PgPool,
}

impl PgSubscriptionRepository {
    /// Create a new subscription repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionRepository for PgSubscriptionRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<SubscriptionRow>> {
        let sub = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            SELECT id, customer_id, product_id, frequency, quantity, discount_percent,
                   next_delivery_date, state, pause_until, created_at, updated_at
            FROM subscriptions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sub)
    }

    async fn find_by_customer(&self, customer_id: Uuid) -> DbResult<Vec<SubscriptionRow>> {
        let subs = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            SELECT id, customer_id, product_id, frequency, quantity, discount_percent,
                   next_delivery_date, state, pause_until, created_at, updated_at
            FROM subscriptions
            WHERE customer_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(subs)
    }

    async fn create(&self, sub: CreateSubscription) -> DbResult<SubscriptionRow> {
        let row = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            INSERT INTO subscriptions (id, customer_id, product_id, frequency, quantity,
                                       discount_percent, next_delivery_date, state)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'active')
            RETURNING id, customer_id, product_id, frequency, quantity, discount_percent,
                      next_delivery_date, state, pause_until, created_at, updated_at
            "#,
        )
        .bind(sub.id)
        .bind(sub.customer_id)
        .bind(sub.product_id)
        .bind(&sub.frequency)
        .bind(sub.quantity)
        .bind(sub.discount_percent)
        .bind(sub.next_delivery_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_active_due_on(&self, date: NaiveDate) -> DbResult<Vec<SubscriptionRow>> {
        let subs = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            SELECT id, customer_id, product_id, frequency, quantity, discount_percent,
                   next_delivery_date, state, pause_until, created_at, updated_at
            FROM subscriptions
            WHERE state = 'active' AND next_delivery_date = $1
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(subs)
    }

    async fn find_active_due_by(&self, date: NaiveDate) -> DbResult<Vec<SubscriptionRow>> {
        let subs = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            SELECT id, customer_id, product_id, frequency, quantity, discount_percent,
                   next_delivery_date, state, pause_until, created_at, updated_at
            FROM subscriptions
            WHERE state = 'active' AND next_delivery_date <= $1
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(subs)
    }

    async fn find_paused_elapsed(&self, date: NaiveDate) -> DbResult<Vec<SubscriptionRow>> {
        let subs = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            SELECT id, customer_id, product_id, frequency, quantity, discount_percent,
                   next_delivery_date, state, pause_until, created_at, updated_at
            FROM subscriptions
            WHERE state = 'paused' AND pause_until <= $1
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(subs)
    }

    async fn set_paused(&self, id: Uuid, until: NaiveDate) -> DbResult<()> {
        sqlx::query(
            r#"
            UPDATE subscriptions
            SET state = 'paused', pause_until = $1, updated_at = NOW()
            WHERE id = $2 AND state != 'cancelled'
            "#,
        )
        .bind(until)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn set_cancelled(&self, id: Uuid) -> DbResult<()> {
        sqlx::query(
            r#"
            UPDATE subscriptions
            SET state = 'cancelled', pause_until = NULL, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn resume(&self, id: Uuid, next_delivery_date: NaiveDate) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET state = 'active', pause_until = NULL, next_delivery_date = $1, updated_at = NOW()
            WHERE id = $2 AND state = 'paused'
            "#,
        )
        .bind(next_delivery_date)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn advance_if_active(&self, id: Uuid, from: NaiveDate, to: NaiveDate) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET next_delivery_date = $1, updated_at = NOW()
            WHERE id = $2 AND state = 'active' AND next_delivery_date = $3
            "#,
        )
        .bind(to)
        .bind(id)
        .bind(from)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn count_by_state(&self) -> DbResult<StateCounts> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT state, COUNT(*) FROM subscriptions GROUP BY state")
                .fetch_all(&self.pool)
                .await?;

        let mut counts = StateCounts::default();
        for (state, count) in rows {
            match state.as_str() {
                "active" => counts.active = count,
                "paused" => counts.paused = count,
                "cancelled" => counts.cancelled = count,
                _ => {}
            }
        }

        Ok(counts)
    }
}
