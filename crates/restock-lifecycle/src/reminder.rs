//! Reminder dispatch
//!
//! Orchestrates the "N days before delivery" notification pass. Token
//! issuance and the reminder log keep the pass idempotent; the transport is
//! the only thing the engine does not own, so its failures defer a cycle to
//! the next tick instead of failing the run.

use chrono::{DateTime, Utc};
use restock_db::{ReminderLogRepository, SubscriptionRepository, TokenRepository};
use restock_types::Subscription;
use std::sync::Arc;

use crate::providers::{Catalog, NotificationTransport};
use crate::schedule::DeliveryScheduler;
use crate::token::TokenManager;
use crate::{LifecycleConfig, LifecycleError};

/// Outcome of one reminder pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReminderRunReport {
    /// Reminders successfully handed to the transport and recorded
    pub dispatched: u32,
    /// Cycles deferred to a later tick (catalog or transport failure)
    pub failed: u32,
    /// Paused subscriptions returned to Active by this pass
    pub resumed: u32,
}

/// Dispatches delivery reminders for due-soon subscriptions
#[derive(Clone)]
pub struct ReminderDispatcher<S, R, T> {
    scheduler: DeliveryScheduler<S, R>,
    tokens: TokenManager<T>,
    reminders: Arc<R>,
    catalog: Arc<dyn Catalog>,
    transport: Arc<dyn NotificationTransport>,
    config: LifecycleConfig,
}

impl<S, R, T> ReminderDispatcher<S, R, T>
where
    S: SubscriptionRepository,
    R: ReminderLogRepository,
    T: TokenRepository,
{
    /// Create a new reminder dispatcher
    pub fn new(
        scheduler: DeliveryScheduler<S, R>,
        tokens: TokenManager<T>,
        reminders: Arc<R>,
        catalog: Arc<dyn Catalog>,
        transport: Arc<dyn NotificationTransport>,
        config: LifecycleConfig,
    ) -> Self {
        Self {
            scheduler,
            tokens,
            reminders,
            catalog,
            transport,
            config,
        }
    }

    /// Run one reminder pass.
    ///
    /// Safe to invoke repeatedly: cycles already in the reminder log are not
    /// returned by the due query, and cycles whose send failed keep their
    /// token and are retried on the next tick.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<ReminderRunReport, LifecycleError> {
        let today = now.date_naive();
        let mut report = ReminderRunReport {
            resumed: self.scheduler.resume_elapsed_pauses(today).await?,
            ..Default::default()
        };

        let due = self
            .scheduler
            .find_due_for_reminder(today, self.config.lead_days)
            .await?;

        tracing::info!(
            due = due.len(),
            lead_days = self.config.lead_days,
            resumed = report.resumed,
            "Reminder pass started"
        );

        for sub in due {
            match self.remind_one(&sub, now).await {
                Ok(()) => report.dispatched += 1,
                Err(e) => {
                    tracing::warn!(
                        subscription_id = %sub.id,
                        cycle_date = %sub.next_delivery_date,
                        error = %e,
                        "Reminder deferred to next tick"
                    );
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            dispatched = report.dispatched,
            failed = report.failed,
            "Reminder pass finished"
        );

        Ok(report)
    }

    /// Send one reminder: issue or reuse the cycle token, render, send,
    /// record. The log write comes last so a failed send leaves the cycle
    /// eligible for retry with the same token.
    async fn remind_one(
        &self,
        sub: &Subscription,
        now: DateTime<Utc>,
    ) -> Result<(), LifecycleError> {
        let cycle_date = sub.next_delivery_date;
        let token = self.tokens.issue_or_reuse(sub.id, cycle_date, now).await?;

        let summary = self.catalog.product_summary(sub.product_id).await?;
        let message = format!(
            "Your {} delivery of {} x {} is scheduled for {}. \
             No action needed to receive it.",
            sub.frequency.label().to_lowercase(),
            sub.quantity,
            summary.name,
            cycle_date
        );
        let link = self.config.confirmation_link(&token.token);

        self.transport.send(sub.customer_id, &message, &link).await?;

        self.reminders.record(sub.id.0, cycle_date, now).await?;

        tracing::debug!(
            subscription_id = %sub.id,
            cycle_date = %cycle_date,
            "Reminder dispatched"
        );

        Ok(())
    }
}

impl<S, R, T> std::fmt::Debug for ReminderDispatcher<S, R, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReminderDispatcher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
