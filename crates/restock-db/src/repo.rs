//! Repository traits
//!
//! Define async repository interfaces for the lifecycle engine's store. The
//! engine is injected with implementations of these traits and never touches
//! process-local state.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::*;

/// Subscription repository trait
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Find a subscription by ID
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<SubscriptionRow>>;

    /// Find all subscriptions owned by a customer
    async fn find_by_customer(&self, customer_id: Uuid) -> DbResult<Vec<SubscriptionRow>>;

    /// Create a new subscription
    async fn create(&self, sub: CreateSubscription) -> DbResult<SubscriptionRow>;

    /// Active subscriptions whose next delivery falls exactly on `date`
    async fn find_active_due_on(&self, date: NaiveDate) -> DbResult<Vec<SubscriptionRow>>;

    /// Active subscriptions whose next delivery is on or before `date`
    async fn find_active_due_by(&self, date: NaiveDate) -> DbResult<Vec<SubscriptionRow>>;

    /// Paused subscriptions whose pause window has elapsed by `date`
    async fn find_paused_elapsed(&self, date: NaiveDate) -> DbResult<Vec<SubscriptionRow>>;

    /// Move a subscription to `paused` until the given date
    async fn set_paused(&self, id: Uuid, until: NaiveDate) -> DbResult<()>;

    /// Move a subscription to `cancelled` (terminal)
    async fn set_cancelled(&self, id: Uuid) -> DbResult<()>;

    /// Return a paused subscription to `active` with a fresh delivery date.
    ///
    /// Conditional on the row still being paused; returns whether this call
    /// performed the transition.
    async fn resume(&self, id: Uuid, next_delivery_date: NaiveDate) -> DbResult<bool>;

    /// Advance the delivery date after a successful materialization.
    ///
    /// Conditional on the row still being active with its date unchanged
    /// since the due query; returns whether the advance happened.
    async fn advance_if_active(
        &self,
        id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DbResult<bool>;

    /// Count subscriptions grouped by state
    async fn count_by_state(&self) -> DbResult<StateCounts>;
}

/// Create subscription input
#[derive(Debug, Clone)]
pub struct CreateSubscription {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub product_id: Uuid,
    pub frequency: String,
    pub quantity: i32,
    pub discount_percent: i16,
    pub next_delivery_date: NaiveDate,
}

/// Confirmation token repository trait
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Create a new token
    async fn create(&self, token: CreateToken) -> DbResult<TokenRow>;

    /// Find a token by its string
    async fn find_by_token(&self, token: &str) -> DbResult<Option<TokenRow>>;

    /// Find the live (unexpired, unconsumed) token for a delivery cycle
    async fn find_live_for_cycle(
        &self,
        subscription_id: Uuid,
        cycle_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> DbResult<Option<TokenRow>>;

    /// Atomically consume a live token, recording the resulting action.
    ///
    /// The expiry and consumed checks and the write are one indivisible
    /// conditional update; returns whether this call won the consumption.
    async fn consume(&self, token: &str, action: &str, now: DateTime<Utc>) -> DbResult<bool>;

    /// Count live tokens (pending customer decisions)
    async fn count_live(&self, now: DateTime<Utc>) -> DbResult<i64>;

    /// Count tokens consumed at or after `since`
    async fn count_consumed_since(&self, since: DateTime<Utc>) -> DbResult<i64>;
}

/// Create token input
#[derive(Debug, Clone)]
pub struct CreateToken {
    pub token: String,
    pub subscription_id: Uuid,
    pub cycle_date: NaiveDate,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Reminder log repository trait
#[async_trait]
pub trait ReminderLogRepository: Send + Sync {
    /// Record that a reminder went out for a cycle.
    ///
    /// Returns false if the cycle was already recorded; the write is
    /// idempotent under concurrent scheduler passes.
    async fn record(
        &self,
        subscription_id: Uuid,
        cycle_date: NaiveDate,
        sent_at: DateTime<Utc>,
    ) -> DbResult<bool>;

    /// Whether a reminder was already recorded for a cycle
    async fn exists(&self, subscription_id: Uuid, cycle_date: NaiveDate) -> DbResult<bool>;

    /// Count reminders sent at or after `since`
    async fn count_sent_since(&self, since: DateTime<Utc>) -> DbResult<i64>;
}
