//! HTTP clients for the engine's external collaborators
//!
//! Each collaborator is a separate service behind a plain JSON API. Failures
//! map to `ProviderError`; the engine decides what a failure defers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use restock_lifecycle::{
    Catalog, NotificationTransport, OrderLedger, ProductSnapshot, ProductSummary, ProviderError,
};
use restock_types::{CustomerId, OrderId, OrderSnapshot, ProductId};

/// Shared HTTP client tuned for collaborator calls
///
/// Aggressive timeouts so one slow collaborator cannot stall a scheduler
/// pass; connection reuse for the bursty daily runs.
fn build_client() -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(5))
        .timeout(Duration::from_secs(10))
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .tcp_nodelay(true)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

fn provider_err(context: &str, err: impl std::fmt::Display) -> ProviderError {
    ProviderError::new(format!("{context}: {err}"))
}

// ============================================================================
// Catalog
// ============================================================================

/// Catalog service client
#[derive(Clone)]
pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct OrderableResponse {
    available: bool,
    unit_price_cents: i64,
}

#[derive(Debug, Deserialize)]
struct ProductResponse {
    name: String,
    image_url: Option<String>,
}

impl HttpCatalog {
    /// Create a new catalog client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: build_client(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl Catalog for HttpCatalog {
    async fn orderable_snapshot(
        &self,
        product_id: ProductId,
    ) -> Result<ProductSnapshot, ProviderError> {
        let url = format!("{}/products/{}/orderable", self.base_url, product_id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| provider_err("catalog request failed", e))?;

        if !response.status().is_success() {
            return Err(provider_err("catalog returned status", response.status()));
        }

        let body: OrderableResponse = response
            .json()
            .await
            .map_err(|e| provider_err("catalog response malformed", e))?;

        Ok(ProductSnapshot {
            available: body.available,
            unit_price_cents: body.unit_price_cents,
        })
    }

    async fn product_summary(
        &self,
        product_id: ProductId,
    ) -> Result<ProductSummary, ProviderError> {
        let url = format!("{}/products/{}", self.base_url, product_id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| provider_err("catalog request failed", e))?;

        if !response.status().is_success() {
            return Err(provider_err("catalog returned status", response.status()));
        }

        let body: ProductResponse = response
            .json()
            .await
            .map_err(|e| provider_err("catalog response malformed", e))?;

        Ok(ProductSummary {
            name: body.name,
            image_url: body.image_url,
        })
    }
}

// ============================================================================
// Notification transport
// ============================================================================

/// Notification service client
#[derive(Clone)]
pub struct HttpNotifier {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    customer_id: CustomerId,
    message: &'a str,
    confirmation_link: &'a str,
}

impl HttpNotifier {
    /// Create a new notification client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: build_client(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl NotificationTransport for HttpNotifier {
    async fn send(
        &self,
        customer_id: CustomerId,
        message: &str,
        confirmation_link: &str,
    ) -> Result<(), ProviderError> {
        let url = format!("{}/notifications", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&SendRequest {
                customer_id,
                message,
                confirmation_link,
            })
            .send()
            .await
            .map_err(|e| provider_err("notification request failed", e))?;

        if !response.status().is_success() {
            return Err(provider_err(
                "notification transport returned status",
                response.status(),
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Order ledger
// ============================================================================

/// Order ledger service client
#[derive(Clone)]
pub struct HttpOrderLedger {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct CreateOrderResponse {
    order_id: OrderId,
}

impl HttpOrderLedger {
    /// Create a new order ledger client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: build_client(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl OrderLedger for HttpOrderLedger {
    async fn create_order(&self, snapshot: &OrderSnapshot) -> Result<OrderId, ProviderError> {
        let url = format!("{}/orders", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(snapshot)
            .send()
            .await
            .map_err(|e| provider_err("order ledger request failed", e))?;

        if !response.status().is_success() {
            return Err(provider_err(
                "order ledger returned status",
                response.status(),
            ));
        }

        let body: CreateOrderResponse = response
            .json()
            .await
            .map_err(|e| provider_err("order ledger response malformed", e))?;

        Ok(body.order_id)
    }
}
