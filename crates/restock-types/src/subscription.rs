//! Subscription types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CustomerId, Frequency, ProductId};

/// Unique subscription identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub Uuid);

impl SubscriptionId {
    /// Create a new random subscription ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a subscription ID from a string
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for SubscriptionId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Subscription lifecycle state
///
/// Paused carries its resume date so an `Active` subscription can never hold
/// a stale pause marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SubscriptionState {
    /// Delivering on schedule
    Active,
    /// Deliveries suspended until the given date
    Paused { until: NaiveDate },
    /// Terminal; never delivers again
    Cancelled,
}

impl SubscriptionState {
    /// Storage label for this state
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused { .. } => "paused",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether the subscription is eligible for scheduling
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Whether the subscription can never deliver again
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl std::fmt::Display for SubscriptionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A customer's standing order for a product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    /// Subscription ID
    pub id: SubscriptionId,
    /// Owning customer
    pub customer_id: CustomerId,
    /// Product being delivered
    pub product_id: ProductId,
    /// Delivery cadence
    pub frequency: Frequency,
    /// Units per delivery (>= 1)
    pub quantity: u32,
    /// Discount percentage snapshotted at creation time (0-100)
    pub discount_percent: u8,
    /// Next scheduled delivery date
    pub next_delivery_date: NaiveDate,
    /// Lifecycle state
    pub state: SubscriptionState,
    /// When the subscription was created
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp
    pub updated_at: DateTime<Utc>,
}

/// Customer decision on an upcoming delivery cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionAction {
    /// Let the delivery happen (same as not responding)
    Continue,
    /// Suspend deliveries until a future date
    Pause,
    /// Stop the subscription permanently
    Cancel,
}

impl std::fmt::Display for DecisionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Continue => write!(f, "continue"),
            Self::Pause => write!(f, "pause"),
            Self::Cancel => write!(f, "cancel"),
        }
    }
}

impl std::str::FromStr for DecisionAction {
    type Err = ActionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "continue" => Ok(Self::Continue),
            "pause" => Ok(Self::Pause),
            "cancel" => Ok(Self::Cancel),
            _ => Err(ActionParseError(s.to_string())),
        }
    }
}

/// Error parsing a decision action string
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid action: {0}")]
pub struct ActionParseError(pub String);
