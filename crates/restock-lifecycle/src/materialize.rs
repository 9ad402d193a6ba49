//! Order materialization
//!
//! Turns due subscription cycles into concrete orders. Silence is consent:
//! a cycle whose token was never redeemed materializes exactly like an
//! explicit Continue. Collaborator failures defer a cycle without advancing
//! its date and without touching the rest of the batch.

use chrono::{DateTime, NaiveDate, Utc};
use restock_db::{ReminderLogRepository, SubscriptionRepository};
use restock_types::{discounted_unit_price_cents, OrderSnapshot, SubscriptionId};
use std::sync::Arc;

use crate::providers::{Catalog, OrderLedger};
use crate::schedule::{next_delivery_date, DeliveryScheduler};
use crate::LifecycleError;

/// Outcome of one materialization pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaterializationReport {
    /// Orders handed to the ledger, with dates advanced
    pub orders_created: u32,
    /// Cycles deferred to the next pass (catalog or ledger failure)
    pub deferred: u32,
    /// Due rows that were no longer eligible when re-read
    pub skipped: u32,
    /// Paused subscriptions returned to Active by this pass
    pub resumed: u32,
}

/// Materializes due subscription cycles into orders
#[derive(Clone)]
pub struct OrderMaterializer<S, R> {
    scheduler: DeliveryScheduler<S, R>,
    subscriptions: Arc<S>,
    catalog: Arc<dyn Catalog>,
    ledger: Arc<dyn OrderLedger>,
}

impl<S, R> OrderMaterializer<S, R>
where
    S: SubscriptionRepository,
    R: ReminderLogRepository,
{
    /// Create a new order materializer
    pub fn new(
        scheduler: DeliveryScheduler<S, R>,
        subscriptions: Arc<S>,
        catalog: Arc<dyn Catalog>,
        ledger: Arc<dyn OrderLedger>,
    ) -> Self {
        Self {
            scheduler,
            subscriptions,
            catalog,
            ledger,
        }
    }

    /// Run one materialization pass.
    ///
    /// One subscription's failure never blocks the others; a deferred cycle
    /// keeps its date and is retried on the next pass.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<MaterializationReport, LifecycleError> {
        let today = now.date_naive();
        let mut report = MaterializationReport {
            resumed: self.scheduler.resume_elapsed_pauses(today).await?,
            ..Default::default()
        };

        let due = self.scheduler.find_due_for_materialization(today).await?;

        tracing::info!(
            due = due.len(),
            resumed = report.resumed,
            "Materialization pass started"
        );

        for sub in due {
            match self.materialize_one(sub.id, today).await {
                Ok(true) => report.orders_created += 1,
                Ok(false) => report.skipped += 1,
                Err(e) => {
                    tracing::warn!(
                        subscription_id = %sub.id,
                        error = %e,
                        "Cycle deferred to next pass"
                    );
                    report.deferred += 1;
                }
            }
        }

        tracing::info!(
            orders_created = report.orders_created,
            deferred = report.deferred,
            skipped = report.skipped,
            "Materialization pass finished"
        );

        Ok(report)
    }

    /// Materialize a single due cycle. Returns false when the subscription
    /// turned out not to be eligible on the fresh read.
    async fn materialize_one(
        &self,
        id: SubscriptionId,
        today: NaiveDate,
    ) -> Result<bool, LifecycleError> {
        // Eligibility is evaluated here, at materialization time; a decision
        // that paused or cancelled since the due query wins.
        let row = self
            .subscriptions
            .find_by_id(id.0)
            .await?
            .ok_or(LifecycleError::SubscriptionNotFound)?;
        let sub = row.to_domain()?;

        if !sub.state.is_active() || sub.next_delivery_date > today {
            return Ok(false);
        }
        let scheduled = sub.next_delivery_date;

        let snapshot = self.catalog.orderable_snapshot(sub.product_id).await?;
        if !snapshot.available {
            return Err(LifecycleError::Dependency(format!(
                "product {} is not orderable",
                sub.product_id
            )));
        }

        let order = OrderSnapshot {
            subscription_id: sub.id,
            customer_id: sub.customer_id,
            product_id: sub.product_id,
            quantity: sub.quantity,
            // The discount recorded at subscription creation, not whatever
            // the discount policy says today.
            unit_price_cents: discounted_unit_price_cents(
                snapshot.unit_price_cents,
                sub.discount_percent,
            ),
            frequency_label: sub.frequency.label(),
            scheduled_date: scheduled,
        };

        let order_id = self.ledger.create_order(&order).await?;

        let next = next_delivery_date(&sub.frequency, scheduled);
        let advanced = self
            .subscriptions
            .advance_if_active(id.0, scheduled, next)
            .await?;

        if advanced {
            tracing::info!(
                subscription_id = %sub.id,
                order_id = %order_id,
                scheduled_date = %scheduled,
                next_delivery_date = %next,
                "Cycle materialized"
            );
        } else {
            // A decision landed between our read and the advance; the order
            // stands (the decision happened-after materialization) but the
            // row is no longer ours to reschedule.
            tracing::warn!(
                subscription_id = %sub.id,
                order_id = %order_id,
                "Subscription changed during materialization; date not advanced"
            );
        }

        Ok(true)
    }
}

impl<S, R> std::fmt::Debug for OrderMaterializer<S, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderMaterializer").finish_non_exhaustive()
    }
}
