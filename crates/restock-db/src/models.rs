//! Database row models
//!
//! These types map directly to database rows using SQLx's FromRow derive.
//! Conversions into domain types live here so every caller gets the same
//! state/pause_until pairing checks.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use restock_types::{
    CustomerId, ProductId, Subscription, SubscriptionId, SubscriptionState,
};

use crate::error::DbError;

/// Subscription row from the database
#[derive(Debug, Clone, FromRow)]
pub struct SubscriptionRow {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub product_id: Uuid,
    pub frequency: String,
    pub quantity: i32,
    pub discount_percent: i16,
    pub next_delivery_date: NaiveDate,
    pub state: String,
    pub pause_until: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SubscriptionRow {
    /// Convert to domain SubscriptionId
    pub fn subscription_id(&self) -> SubscriptionId {
        SubscriptionId(self.id)
    }

    /// Convert to the domain subscription, validating stored invariants.
    ///
    /// A `paused` row must carry `pause_until`; any other state must not.
    pub fn to_domain(&self) -> Result<Subscription, DbError> {
        let state = match (self.state.as_str(), self.pause_until) {
            ("active", None) => SubscriptionState::Active,
            ("paused", Some(until)) => SubscriptionState::Paused { until },
            ("cancelled", _) => SubscriptionState::Cancelled,
            (other, pause_until) => {
                return Err(DbError::InvalidRow(format!(
                    "subscription {}: state {:?} with pause_until {:?}",
                    self.id, other, pause_until
                )))
            }
        };

        let frequency = self
            .frequency
            .parse()
            .map_err(|e| DbError::InvalidRow(format!("subscription {}: {}", self.id, e)))?;

        let quantity = u32::try_from(self.quantity).map_err(|_| {
            DbError::InvalidRow(format!("subscription {}: quantity {}", self.id, self.quantity))
        })?;

        let discount_percent = u8::try_from(self.discount_percent).map_err(|_| {
            DbError::InvalidRow(format!(
                "subscription {}: discount {}",
                self.id, self.discount_percent
            ))
        })?;

        Ok(Subscription {
            id: SubscriptionId(self.id),
            customer_id: CustomerId(self.customer_id),
            product_id: ProductId(self.product_id),
            frequency,
            quantity,
            discount_percent,
            next_delivery_date: self.next_delivery_date,
            state,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Confirmation token row from the database
///
/// The token string is stored verbatim: the reminder dispatcher must be able
/// to re-send the exact link a customer already received.
#[derive(Debug, Clone, FromRow)]
pub struct TokenRow {
    pub token: String,
    pub subscription_id: Uuid,
    pub cycle_date: NaiveDate,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
    pub resulting_action: Option<String>,
}

impl TokenRow {
    /// Convert to domain SubscriptionId
    pub fn subscription_id(&self) -> SubscriptionId {
        SubscriptionId(self.subscription_id)
    }

    /// Whether the validity window has passed
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Whether a decision was already recorded against this token
    pub fn is_consumed(&self) -> bool {
        self.consumed_at.is_some()
    }

    /// Valid for redemption: unexpired and unconsumed
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        !self.is_expired(now) && !self.is_consumed()
    }
}

/// Reminder log row from the database
///
/// Keyed by (subscription_id, cycle_date); its existence is what makes the
/// reminder pass idempotent.
#[derive(Debug, Clone, FromRow)]
pub struct ReminderRow {
    pub subscription_id: Uuid,
    pub cycle_date: NaiveDate,
    pub sent_at: DateTime<Utc>,
}

/// Subscription counts grouped by lifecycle state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateCounts {
    pub active: i64,
    pub paused: i64,
    pub cancelled: i64,
}
