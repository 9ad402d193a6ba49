//! Confirmation link handlers
//!
//! Token possession is the only credential on these routes; there is no
//! session or login requirement.

use axum::extract::{Path, State};
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use restock_lifecycle::ConfirmationDetails;
use restock_types::DecisionAction;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ConfirmationResponse {
    pub subscription_id: String,
    pub product_name: String,
    pub product_image_url: Option<String>,
    pub scheduled_date: String,
    pub frequency: String,
    pub quantity: u32,
    pub total_cents: Option<i64>,
    pub is_expired: bool,
    pub is_already_processed: bool,
}

impl From<ConfirmationDetails> for ConfirmationResponse {
    fn from(details: ConfirmationDetails) -> Self {
        Self {
            subscription_id: details.subscription_id.to_string(),
            product_name: details.product_name,
            product_image_url: details.product_image_url,
            scheduled_date: details.scheduled_date.to_string(),
            frequency: details.frequency_label,
            quantity: details.quantity,
            total_cents: details.total_cents,
            is_expired: details.is_expired,
            is_already_processed: details.is_already_processed,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub action: String,
    pub pause_until: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct DecisionResponse {
    pub subscription_id: String,
    pub action: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/confirmations/{token}
pub async fn get_confirmation(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ApiResult<Json<ConfirmationResponse>> {
    let details = state
        .decisions
        .confirmation_details(&token, Utc::now())
        .await?;

    Ok(Json(ConfirmationResponse::from(details)))
}

/// POST /api/v1/confirmations/{token}/decision
pub async fn submit_decision(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(req): Json<DecisionRequest>,
) -> ApiResult<Json<DecisionResponse>> {
    let start = Instant::now();

    let action: DecisionAction = req
        .action
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid action: {}", req.action)))?;

    let outcome = state
        .decisions
        .process(&token, action, req.pause_until, Utc::now())
        .await?;

    metrics::counter!("lifecycle_decisions_total", "action" => outcome.action.to_string())
        .increment(1);
    metrics::histogram!("lifecycle_operation_duration_seconds", "operation" => "submit_decision")
        .record(start.elapsed().as_secs_f64());

    tracing::info!(
        subscription_id = %outcome.subscription_id,
        action = %outcome.action,
        "Decision accepted"
    );

    Ok(Json(DecisionResponse {
        subscription_id: outcome.subscription_id.to_string(),
        action: outcome.action.to_string(),
    }))
}
