//! Application state for the Storefront API service.

use restock_db::pg::{
    PgReminderLogRepository, PgSubscriptionRepository, PgTokenRepository, Repositories,
};
use restock_db::DbPool;
use restock_lifecycle::{
    DecisionProcessor, OrderMaterializer, ReminderDispatcher, StatsAggregator,
};
use std::sync::Arc;

use crate::config::Config;

/// Engine components instantiated over the PostgreSQL repositories
pub type Dispatcher =
    ReminderDispatcher<PgSubscriptionRepository, PgReminderLogRepository, PgTokenRepository>;
pub type Materializer = OrderMaterializer<PgSubscriptionRepository, PgReminderLogRepository>;
pub type Decisions = DecisionProcessor<PgSubscriptionRepository, PgTokenRepository>;
pub type Stats =
    StatsAggregator<PgSubscriptionRepository, PgReminderLogRepository, PgTokenRepository>;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Reminder dispatcher (operator-triggered pass)
    pub dispatcher: Arc<Dispatcher>,
    /// Order materializer (operator-triggered pass)
    pub materializer: Arc<Materializer>,
    /// Customer decision processor
    pub decisions: Arc<Decisions>,
    /// Lifecycle statistics aggregator
    pub stats: Arc<Stats>,
    /// Database repositories (for owner-direct subscription management)
    pub repos: Repositories,
    /// Database pool (for readiness checks)
    pub pool: DbPool,
    /// Configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        dispatcher: Dispatcher,
        materializer: Materializer,
        decisions: Decisions,
        stats: Stats,
        repos: Repositories,
        pool: DbPool,
        config: Config,
    ) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            materializer: Arc::new(materializer),
            decisions: Arc::new(decisions),
            stats: Arc::new(stats),
            repos,
            pool,
            config: Arc::new(config),
        }
    }

    /// Get request timeout from config
    pub fn request_timeout(&self) -> std::time::Duration {
        self.config.request_timeout
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
