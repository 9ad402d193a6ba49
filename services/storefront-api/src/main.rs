//! Restock Storefront API
//!
//! Subscription lifecycle service for the recurring-delivery storefront.
//!
//! ## REST Endpoints
//!
//! - `GET  /api/v1/confirmations/{token}` - Confirmation details by token
//! - `POST /api/v1/confirmations/{token}/decision` - Submit continue/pause/cancel
//! - `POST /api/v1/admin/reminders/run` - Trigger a reminder pass
//! - `POST /api/v1/admin/materialize/run` - Trigger a materialization pass
//! - `GET  /api/v1/admin/stats` - Lifecycle statistics
//! - `POST /api/v1/subscriptions` - Create a subscription
//! - `GET  /api/v1/customers/{id}/subscriptions` - List a customer's subscriptions
//! - `POST /api/v1/subscriptions/{id}/pause` - Pause (owner-direct)
//! - `POST /api/v1/subscriptions/{id}/resume` - Resume (owner-direct)
//! - `POST /api/v1/subscriptions/{id}/cancel` - Cancel (owner-direct)
//!
//! ## Health Endpoints
//!
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//! - `GET /metrics` - Prometheus metrics

mod collaborators;
mod config;
mod error;
mod handlers;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use restock_db::pg::Repositories;
use restock_lifecycle::{
    DecisionProcessor, DeliveryScheduler, OrderMaterializer, ReminderDispatcher, StatsAggregator,
    TokenManager,
};
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::collaborators::{HttpCatalog, HttpNotifier, HttpOrderLedger};
use crate::config::Config;
use crate::handlers::{health, ready};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("storefront_api=debug".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Restock Storefront API");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(
        http_port = config.http_port,
        lead_days = config.lifecycle.lead_days,
        "Configuration loaded"
    );

    // Initialize metrics
    let metrics_handle = if config.metrics_enabled {
        Some(setup_metrics()?)
    } else {
        None
    };

    // Create database pool
    let pool = restock_db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    // Create repositories
    let repos = Repositories::new(pool.clone());
    let subscriptions = Arc::new(repos.subscriptions.clone());
    let tokens_repo = Arc::new(repos.tokens.clone());
    let reminders_repo = Arc::new(repos.reminders.clone());

    // Create collaborator clients
    let catalog = Arc::new(HttpCatalog::new(config.catalog_url.clone()));
    let transport = Arc::new(HttpNotifier::new(config.notification_url.clone()));
    let ledger = Arc::new(HttpOrderLedger::new(config.order_ledger_url.clone()));

    // Wire the lifecycle engine
    let scheduler = DeliveryScheduler::new(subscriptions.clone(), reminders_repo.clone());
    let tokens = TokenManager::new(tokens_repo.clone(), config.lifecycle.clone());
    let dispatcher = ReminderDispatcher::new(
        scheduler.clone(),
        tokens.clone(),
        reminders_repo.clone(),
        catalog.clone(),
        transport,
        config.lifecycle.clone(),
    );
    let materializer = OrderMaterializer::new(
        scheduler.clone(),
        subscriptions.clone(),
        catalog.clone(),
        ledger,
    );
    let decisions = DecisionProcessor::new(subscriptions.clone(), tokens, catalog);
    let stats = StatsAggregator::new(subscriptions, reminders_repo, tokens_repo);

    // Create application state
    let state = AppState::new(
        dispatcher,
        materializer,
        decisions,
        stats,
        repos,
        pool,
        config.clone(),
    );

    // Build HTTP router
    let app = build_router(state, metrics_handle);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    run_http_server(app, addr).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn build_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let request_timeout = state.request_timeout();

    // API v1 routes
    let api_v1 = Router::new()
        // Confirmation link routes (token possession is the credential)
        .route("/confirmations/{token}", get(handlers::get_confirmation))
        .route(
            "/confirmations/{token}/decision",
            post(handlers::submit_decision),
        )
        // Operator routes
        .route("/admin/reminders/run", post(handlers::run_reminders))
        .route("/admin/materialize/run", post(handlers::run_materialization))
        .route("/admin/stats", get(handlers::get_stats))
        // Owner-direct subscription management
        .route("/subscriptions", post(handlers::create_subscription))
        .route(
            "/subscriptions/{id}/pause",
            post(handlers::pause_subscription),
        )
        .route(
            "/subscriptions/{id}/resume",
            post(handlers::resume_subscription),
        )
        .route(
            "/subscriptions/{id}/cancel",
            post(handlers::cancel_subscription),
        )
        .route(
            "/customers/{id}/subscriptions",
            get(handlers::list_customer_subscriptions),
        );

    // Health routes (no timeout - must always respond quickly)
    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready));

    // Metrics route (no timeout)
    let metrics_route = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    // Build middleware stack (order matters - outermost first)
    let middleware = ServiceBuilder::new()
        // Request ID propagation (outermost)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        // Tracing with request details
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // CORS
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        // Request timeout (innermost - closest to handler)
        .layer(TimeoutLayer::new(request_timeout));

    // Combine all routes
    Router::new()
        .nest("/api/v1", api_v1)
        .layer(middleware)
        .merge(health_routes) // Health routes without timeout
        .merge(metrics_route) // Metrics route without timeout
        .with_state(state)
}

async fn run_http_server(app: Router, addr: SocketAddr) -> anyhow::Result<()> {
    tracing::info!("HTTP server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn setup_metrics() -> anyhow::Result<PrometheusHandle> {
    // Latency buckets sized for store queries plus one collaborator hop
    let lifecycle_latency_buckets = &[0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.2, 0.5, 1.0, 2.5];

    let builder = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            lifecycle_latency_buckets,
        )?
        .set_buckets_for_metric(
            Matcher::Full("lifecycle_operation_duration_seconds".to_string()),
            lifecycle_latency_buckets,
        )?;

    let handle = builder.install_recorder()?;

    // Register metrics with descriptions
    metrics::describe_counter!(
        "lifecycle_reminders_dispatched_total",
        "Total reminders handed to the notification transport"
    );
    metrics::describe_counter!(
        "lifecycle_orders_materialized_total",
        "Total orders created from due subscription cycles"
    );
    metrics::describe_counter!(
        "lifecycle_cycles_deferred_total",
        "Total cycles deferred by collaborator failures"
    );
    metrics::describe_counter!(
        "lifecycle_decisions_total",
        "Total customer decisions by action"
    );
    metrics::describe_counter!(
        "lifecycle_subscriptions_created_total",
        "Total subscriptions created"
    );
    metrics::describe_counter!(
        "lifecycle_subscriptions_cancelled_total",
        "Total subscriptions cancelled"
    );
    metrics::describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request latency in seconds"
    );
    metrics::describe_histogram!(
        "lifecycle_operation_duration_seconds",
        "Lifecycle operation latency in seconds by operation type"
    );

    Ok(handle)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
