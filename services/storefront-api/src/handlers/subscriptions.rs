//! Owner-direct subscription management
//!
//! These routes sit behind the storefront's session auth (terminated
//! upstream); they act on subscriptions directly rather than through
//! confirmation tokens.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use restock_db::{CreateSubscription, SubscriptionRepository, SubscriptionRow};
use restock_lifecycle::next_delivery_date;
use restock_types::Frequency;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Discounts are percentages; anything above this is a request bug
const MAX_DISCOUNT_PERCENT: u8 = 100;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateSubscriptionRequest {
    pub customer_id: String,
    pub product_id: String,
    pub frequency: String,
    pub quantity: u32,
    pub discount_percent: u8,
    pub next_delivery_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct PauseSubscriptionRequest {
    pub pause_until: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    pub id: String,
    pub customer_id: String,
    pub product_id: String,
    pub frequency: String,
    pub quantity: i32,
    pub discount_percent: i16,
    pub next_delivery_date: String,
    pub state: String,
    pub pause_until: Option<String>,
}

impl From<SubscriptionRow> for SubscriptionResponse {
    fn from(row: SubscriptionRow) -> Self {
        Self {
            id: row.id.to_string(),
            customer_id: row.customer_id.to_string(),
            product_id: row.product_id.to_string(),
            frequency: row.frequency.clone(),
            quantity: row.quantity,
            discount_percent: row.discount_percent,
            next_delivery_date: row.next_delivery_date.to_string(),
            state: row.state.clone(),
            pause_until: row.pause_until.map(|d| d.to_string()),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/subscriptions
pub async fn create_subscription(
    State(state): State<AppState>,
    Json(req): Json<CreateSubscriptionRequest>,
) -> ApiResult<(StatusCode, Json<SubscriptionResponse>)> {
    let customer_id = Uuid::parse_str(&req.customer_id)
        .map_err(|_| ApiError::BadRequest("Invalid customer_id".to_string()))?;
    let product_id = Uuid::parse_str(&req.product_id)
        .map_err(|_| ApiError::BadRequest("Invalid product_id".to_string()))?;

    let frequency: Frequency = req
        .frequency
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid frequency: {}", req.frequency)))?;

    if req.quantity < 1 {
        return Err(ApiError::BadRequest("Quantity must be at least 1".to_string()));
    }
    if req.discount_percent > MAX_DISCOUNT_PERCENT {
        return Err(ApiError::BadRequest(
            "Discount percent cannot exceed 100".to_string(),
        ));
    }
    if req.next_delivery_date < Utc::now().date_naive() {
        return Err(ApiError::BadRequest(
            "First delivery date cannot be in the past".to_string(),
        ));
    }

    let row = state
        .repos
        .subscriptions
        .create(CreateSubscription {
            id: Uuid::new_v4(),
            customer_id,
            product_id,
            frequency: frequency.to_string(),
            quantity: req.quantity as i32,
            discount_percent: i16::from(req.discount_percent),
            next_delivery_date: req.next_delivery_date,
        })
        .await?;

    metrics::counter!("lifecycle_subscriptions_created_total").increment(1);
    tracing::info!(subscription_id = %row.id, customer_id = %customer_id, "Subscription created");

    Ok((StatusCode::CREATED, Json(row.into())))
}

/// GET /api/v1/customers/{id}/subscriptions
pub async fn list_customer_subscriptions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<SubscriptionResponse>>> {
    let customer_id = Uuid::parse_str(&id)
        .map_err(|_| ApiError::BadRequest("Invalid customer_id".to_string()))?;

    let rows = state.repos.subscriptions.find_by_customer(customer_id).await?;

    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// POST /api/v1/subscriptions/{id}/pause
pub async fn pause_subscription(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<PauseSubscriptionRequest>,
) -> ApiResult<Json<SubscriptionResponse>> {
    let id = parse_subscription_id(&id)?;

    if req.pause_until <= Utc::now().date_naive() {
        return Err(ApiError::BadRequest(
            "pause_until must be a future date".to_string(),
        ));
    }

    let row = fetch_subscription(&state, id).await?;
    if row.state == "cancelled" {
        return Err(ApiError::BadRequest(
            "Cancelled subscriptions cannot be paused".to_string(),
        ));
    }

    state.repos.subscriptions.set_paused(id, req.pause_until).await?;
    tracing::info!(subscription_id = %id, pause_until = %req.pause_until, "Subscription paused");

    Ok(Json(fetch_subscription(&state, id).await?.into()))
}

/// POST /api/v1/subscriptions/{id}/resume
pub async fn resume_subscription(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SubscriptionResponse>> {
    let id = parse_subscription_id(&id)?;

    let row = fetch_subscription(&state, id).await?;
    let sub = row.to_domain()?;

    // Resuming early behaves exactly like an elapsed pause: the next
    // delivery is computed from today, not the pre-pause schedule
    let fresh = next_delivery_date(&sub.frequency, Utc::now().date_naive());
    let resumed = state.repos.subscriptions.resume(id, fresh).await?;
    if !resumed {
        return Err(ApiError::BadRequest(
            "Only paused subscriptions can be resumed".to_string(),
        ));
    }

    tracing::info!(subscription_id = %id, next_delivery_date = %fresh, "Subscription resumed");

    Ok(Json(fetch_subscription(&state, id).await?.into()))
}

/// POST /api/v1/subscriptions/{id}/cancel
pub async fn cancel_subscription(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SubscriptionResponse>> {
    let id = parse_subscription_id(&id)?;

    // Existence check first so an unknown ID is a 404, not a silent no-op
    fetch_subscription(&state, id).await?;

    state.repos.subscriptions.set_cancelled(id).await?;
    metrics::counter!("lifecycle_subscriptions_cancelled_total").increment(1);
    tracing::info!(subscription_id = %id, "Subscription cancelled");

    Ok(Json(fetch_subscription(&state, id).await?.into()))
}

// ============================================================================
// Helpers
// ============================================================================

fn parse_subscription_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::BadRequest("Invalid subscription id".to_string()))
}

async fn fetch_subscription(state: &AppState, id: Uuid) -> Result<SubscriptionRow, ApiError> {
    state
        .repos
        .subscriptions
        .find_by_id(id)
        .await?
        .ok_or(ApiError::SubscriptionNotFound)
}
