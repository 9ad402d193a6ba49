//! PostgreSQL confirmation token repository implementation

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::TokenRow;
use crate::repo::{CreateToken, TokenRepository};

/// PostgreSQL confirmation token repository
#[derive(Clone)]
pub struct PgTokenRepository {
    pool: PgPool,
}

impl PgTokenRepository {
    /// Create a new token repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenRepository for PgTokenRepository {
    async fn create(&self, token: CreateToken) -> DbResult<TokenRow> {
        let row = sqlx::query_as::<_, TokenRow>(
            r#"
            INSERT INTO confirmation_tokens (token, subscription_id, cycle_date,
                                             issued_at, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING token, subscription_id, cycle_date, issued_at, expires_at,
                      consumed_at, resulting_action
            "#,
        )
        .bind(&token.token)
        .bind(token.subscription_id)
        .bind(token.cycle_date)
        .bind(token.issued_at)
        .bind(token.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_by_token(&self, token: &str) -> DbResult<Option<TokenRow>> {
        let row = sqlx::query_as::<_, TokenRow>(
            r#"
            SELECT token, subscription_id, cycle_date, issued_at, expires_at,
                   consumed_at, resulting_action
            FROM confirmation_tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_live_for_cycle(
        &self,
        subscription_id: Uuid,
        cycle_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> DbResult<Option<TokenRow>> {
        let row = sqlx::query_as::<_, TokenRow>(
            r#"
            SELECT token, subscription_id, cycle_date, issued_at, expires_at,
                   consumed_at, resulting_action
            FROM confirmation_tokens
            WHERE subscription_id = $1 AND cycle_date = $2
              AND consumed_at IS NULL AND expires_at > $3
            ORDER BY issued_at DESC
            LIMIT 1
            "#,
        )
        .bind(subscription_id)
        .bind(cycle_date)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn consume(&self, token: &str, action: &str, now: DateTime<Utc>) -> DbResult<bool> {
        // The validity check and the write are one conditional update, so two
        // concurrent redemption attempts can never both succeed.
        let result = sqlx::query(
            r#"
            UPDATE confirmation_tokens
            SET consumed_at = $2, resulting_action = $3
            WHERE token = $1 AND consumed_at IS NULL AND expires_at > $2
            "#,
        )
        .bind(token)
        .bind(now)
        .bind(action)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn count_live(&self, now: DateTime<Utc>) -> DbResult<i64> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM confirmation_tokens \
             WHERE consumed_at IS NULL AND expires_at > $1",
        )
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn count_consumed_since(&self, since: DateTime<Utc>) -> DbResult<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM confirmation_tokens WHERE consumed_at >= $1")
                .bind(since)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}
