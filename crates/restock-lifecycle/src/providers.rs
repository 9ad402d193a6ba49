//! External collaborator abstractions
//!
//! The engine consumes three collaborators: the product catalog (read-only),
//! the notification transport, and the order ledger (the only write this
//! core performs outside its own store). All are fallible; a failure defers
//! the affected cycle, never the whole run.

use async_trait::async_trait;

use restock_types::{CustomerId, OrderId, OrderSnapshot, ProductId};

/// Collaborator failure
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct ProviderError(pub String);

impl ProviderError {
    /// Create a new provider error
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Orderability and pricing for a product, as the catalog reports it now
#[derive(Debug, Clone)]
pub struct ProductSnapshot {
    /// Whether the product can currently be ordered
    pub available: bool,
    /// Current unit price in cents, before any subscription discount
    pub unit_price_cents: i64,
}

/// Display details for a product
#[derive(Debug, Clone)]
pub struct ProductSummary {
    /// Product display name
    pub name: String,
    /// Product image, if the catalog has one
    pub image_url: Option<String>,
}

/// Product catalog collaborator
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Orderability and current pricing for a product
    async fn orderable_snapshot(&self, product_id: ProductId)
        -> Result<ProductSnapshot, ProviderError>;

    /// Display details for the confirmation screen and reminder message
    async fn product_summary(&self, product_id: ProductId)
        -> Result<ProductSummary, ProviderError>;
}

/// Notification transport collaborator
///
/// The engine decides what and when to send; delivery and delivery retries
/// are the transport's concern.
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    /// Send a rendered reminder carrying the confirmation link
    async fn send(
        &self,
        customer_id: CustomerId,
        message: &str,
        confirmation_link: &str,
    ) -> Result<(), ProviderError>;
}

/// Order ledger collaborator
#[async_trait]
pub trait OrderLedger: Send + Sync {
    /// Record one materialized delivery; append-only
    async fn create_order(&self, snapshot: &OrderSnapshot) -> Result<OrderId, ProviderError>;
}
