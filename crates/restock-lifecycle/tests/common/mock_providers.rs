//! Mock external collaborators for testing

use async_trait::async_trait;
use dashmap::DashMap;
use restock_lifecycle::{
    Catalog, NotificationTransport, OrderLedger, ProductSnapshot, ProductSummary, ProviderError,
};
use restock_types::{CustomerId, OrderId, OrderSnapshot, ProductId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

/// In-memory catalog; unknown products are treated as not orderable
#[derive(Default)]
pub struct MockCatalog {
    products: DashMap<Uuid, (ProductSnapshot, ProductSummary)>,
    fail: AtomicBool,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a product with a price and a name
    pub fn insert_product(&self, product_id: ProductId, unit_price_cents: i64, name: &str) {
        self.products.insert(
            product_id.0,
            (
                ProductSnapshot {
                    available: true,
                    unit_price_cents,
                },
                ProductSummary {
                    name: name.to_string(),
                    image_url: None,
                },
            ),
        );
    }

    /// Mark a product as no longer orderable
    #[allow(dead_code)]
    pub fn mark_unorderable(&self, product_id: ProductId) {
        if let Some(mut entry) = self.products.get_mut(&product_id.0) {
            entry.0.available = false;
        }
    }

    /// Change a product's current price (subscriptions keep their snapshot)
    #[allow(dead_code)]
    pub fn set_price(&self, product_id: ProductId, unit_price_cents: i64) {
        if let Some(mut entry) = self.products.get_mut(&product_id.0) {
            entry.0.unit_price_cents = unit_price_cents;
        }
    }

    /// Make every catalog call fail
    #[allow(dead_code)]
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl Catalog for MockCatalog {
    async fn orderable_snapshot(
        &self,
        product_id: ProductId,
    ) -> Result<ProductSnapshot, ProviderError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ProviderError::new("catalog unavailable"));
        }
        self.products
            .get(&product_id.0)
            .map(|entry| entry.0.clone())
            .ok_or_else(|| ProviderError::new(format!("unknown product {product_id}")))
    }

    async fn product_summary(
        &self,
        product_id: ProductId,
    ) -> Result<ProductSummary, ProviderError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ProviderError::new("catalog unavailable"));
        }
        self.products
            .get(&product_id.0)
            .map(|entry| entry.1.clone())
            .ok_or_else(|| ProviderError::new(format!("unknown product {product_id}")))
    }
}

/// Recorded notification send
#[derive(Debug, Clone)]
pub struct SentNotification {
    pub customer_id: CustomerId,
    pub message: String,
    pub confirmation_link: String,
}

/// In-memory notification transport; records everything it sends
#[derive(Default)]
pub struct MockTransport {
    pub sent: Mutex<Vec<SentNotification>>,
    fail: AtomicBool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every send fail
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    /// Number of notifications sent so far
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl NotificationTransport for MockTransport {
    async fn send(
        &self,
        customer_id: CustomerId,
        message: &str,
        confirmation_link: &str,
    ) -> Result<(), ProviderError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ProviderError::new("transport unavailable"));
        }
        self.sent.lock().unwrap().push(SentNotification {
            customer_id,
            message: message.to_string(),
            confirmation_link: confirmation_link.to_string(),
        });
        Ok(())
    }
}

/// In-memory order ledger; records every materialized order
#[derive(Default)]
pub struct MockLedger {
    pub orders: Mutex<Vec<OrderSnapshot>>,
    fail: AtomicBool,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every order creation fail
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    /// Number of orders created so far
    pub fn order_count(&self) -> usize {
        self.orders.lock().unwrap().len()
    }

    /// Orders created for one subscription
    pub fn orders_for(&self, subscription_id: restock_types::SubscriptionId) -> Vec<OrderSnapshot> {
        self.orders
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.subscription_id == subscription_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl OrderLedger for MockLedger {
    async fn create_order(&self, snapshot: &OrderSnapshot) -> Result<OrderId, ProviderError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ProviderError::new("order ledger unavailable"));
        }
        self.orders.lock().unwrap().push(snapshot.clone());
        Ok(OrderId(Uuid::new_v4()))
    }
}
