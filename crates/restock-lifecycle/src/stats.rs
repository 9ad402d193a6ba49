//! Lifecycle statistics
//!
//! Read-only rollup over the store for operational visibility. Contributes
//! no write behavior.

use chrono::{DateTime, NaiveTime, Utc};
use restock_db::{ReminderLogRepository, SubscriptionRepository, TokenRepository};
use serde::Serialize;
use std::sync::Arc;

use crate::LifecycleError;

/// Point-in-time lifecycle counts
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LifecycleStats {
    /// Subscriptions delivering on schedule
    pub active: i64,
    /// Subscriptions waiting out a pause
    pub paused: i64,
    /// Terminally cancelled subscriptions
    pub cancelled: i64,
    /// Live tokens awaiting a customer decision
    pub pending_decisions: i64,
    /// Decisions recorded since midnight UTC
    pub decisions_today: i64,
    /// Reminders sent since midnight UTC
    pub reminders_sent_today: i64,
}

/// Aggregates lifecycle statistics from the store
#[derive(Clone)]
pub struct StatsAggregator<S, R, T> {
    subscriptions: Arc<S>,
    reminders: Arc<R>,
    tokens: Arc<T>,
}

impl<S, R, T> StatsAggregator<S, R, T>
where
    S: SubscriptionRepository,
    R: ReminderLogRepository,
    T: TokenRepository,
{
    /// Create a new stats aggregator
    pub fn new(subscriptions: Arc<S>, reminders: Arc<R>, tokens: Arc<T>) -> Self {
        Self {
            subscriptions,
            reminders,
            tokens,
        }
    }

    /// Snapshot current lifecycle counts
    pub async fn snapshot(&self, now: DateTime<Utc>) -> Result<LifecycleStats, LifecycleError> {
        let midnight = now.date_naive().and_time(NaiveTime::MIN).and_utc();

        let counts = self.subscriptions.count_by_state().await?;
        let pending_decisions = self.tokens.count_live(now).await?;
        let decisions_today = self.tokens.count_consumed_since(midnight).await?;
        let reminders_sent_today = self.reminders.count_sent_since(midnight).await?;

        Ok(LifecycleStats {
            active: counts.active,
            paused: counts.paused,
            cancelled: counts.cancelled,
            pending_decisions,
            decisions_today,
            reminders_sent_today,
        })
    }
}

impl<S, R, T> std::fmt::Debug for StatsAggregator<S, R, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsAggregator").finish_non_exhaustive()
    }
}
