//! Materialized order types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CustomerId, ProductId, SubscriptionId};

/// Unique order identifier, assigned by the order ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub Uuid);

impl OrderId {
    /// Parse an order ID from a string
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for OrderId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Everything the order ledger needs to record one materialized delivery.
///
/// Append-only once handed to the ledger. The unit price already carries the
/// discount percentage snapshotted at subscription creation time, not the
/// catalog's current discount policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSnapshot {
    /// Subscription this cycle belongs to
    pub subscription_id: SubscriptionId,
    /// Owning customer
    pub customer_id: CustomerId,
    /// Product being delivered
    pub product_id: ProductId,
    /// Units in this delivery
    pub quantity: u32,
    /// Unit price in cents after the creation-time discount
    pub unit_price_cents: i64,
    /// Cadence label for the order record, e.g. "Monthly"
    pub frequency_label: String,
    /// The cycle's scheduled delivery date
    pub scheduled_date: NaiveDate,
}

impl OrderSnapshot {
    /// Total amount for this delivery in cents
    pub fn total_cents(&self) -> i64 {
        self.unit_price_cents * i64::from(self.quantity)
    }
}

/// Apply a percentage discount to a unit price, rounding down to whole cents.
///
/// Discounts above 100% clamp to free rather than going negative.
pub fn discounted_unit_price_cents(unit_price_cents: i64, discount_percent: u8) -> i64 {
    let keep = i64::from(100u8.saturating_sub(discount_percent));
    unit_price_cents * keep / 100
}
