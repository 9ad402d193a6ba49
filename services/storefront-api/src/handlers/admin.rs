//! Operator endpoints: scheduler triggers and lifecycle statistics

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use std::time::Instant;

use restock_lifecycle::LifecycleStats;

use crate::error::ApiResult;
use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ReminderRunResponse {
    pub dispatched: u32,
    pub failed: u32,
    pub resumed: u32,
}

#[derive(Debug, Serialize)]
pub struct MaterializationRunResponse {
    pub orders_created: u32,
    pub deferred: u32,
    pub skipped: u32,
    pub resumed: u32,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/admin/reminders/run
pub async fn run_reminders(
    State(state): State<AppState>,
) -> ApiResult<Json<ReminderRunResponse>> {
    let start = Instant::now();

    let report = state.dispatcher.run(Utc::now()).await?;

    metrics::counter!("lifecycle_reminders_dispatched_total")
        .increment(u64::from(report.dispatched));
    metrics::histogram!("lifecycle_operation_duration_seconds", "operation" => "reminder_run")
        .record(start.elapsed().as_secs_f64());

    Ok(Json(ReminderRunResponse {
        dispatched: report.dispatched,
        failed: report.failed,
        resumed: report.resumed,
    }))
}

/// POST /api/v1/admin/materialize/run
pub async fn run_materialization(
    State(state): State<AppState>,
) -> ApiResult<Json<MaterializationRunResponse>> {
    let start = Instant::now();

    let report = state.materializer.run(Utc::now()).await?;

    metrics::counter!("lifecycle_orders_materialized_total")
        .increment(u64::from(report.orders_created));
    metrics::counter!("lifecycle_cycles_deferred_total").increment(u64::from(report.deferred));
    metrics::histogram!("lifecycle_operation_duration_seconds", "operation" => "materialize_run")
        .record(start.elapsed().as_secs_f64());

    Ok(Json(MaterializationRunResponse {
        orders_created: report.orders_created,
        deferred: report.deferred,
        skipped: report.skipped,
        resumed: report.resumed,
    }))
}

/// GET /api/v1/admin/stats
pub async fn get_stats(State(state): State<AppState>) -> ApiResult<Json<LifecycleStats>> {
    let stats = state.stats.snapshot(Utc::now()).await?;
    Ok(Json(stats))
}
