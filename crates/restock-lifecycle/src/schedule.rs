//! Delivery scheduling
//!
//! Pure next-date computation plus the due queries the scheduler passes run
//! against the store. Both passes call [`DeliveryScheduler::resume_elapsed_pauses`]
//! first so a subscription coming out of a pause gets a date computed from
//! "now" instead of replaying its stale pre-pause schedule.

use chrono::{Days, Months, NaiveDate};
use restock_db::{ReminderLogRepository, SubscriptionRepository};
use restock_types::{Frequency, IntervalUnit, Subscription};
use std::sync::Arc;

use crate::LifecycleError;

/// Compute the delivery date following `anchor` for the given cadence.
///
/// Deterministic for identical inputs. Monthly is day-of-month preserving
/// with end-of-month clamping (Jan 31 -> Feb 28/29).
pub fn next_delivery_date(frequency: &Frequency, anchor: NaiveDate) -> NaiveDate {
    match frequency {
        Frequency::Weekly => add_days(anchor, 7),
        Frequency::BiWeekly => add_days(anchor, 14),
        Frequency::Monthly => add_months(anchor, 1),
        Frequency::Custom { value, unit } => match unit {
            IntervalUnit::Days => add_days(anchor, u64::from(*value)),
            IntervalUnit::Weeks => add_days(anchor, u64::from(*value) * 7),
            IntervalUnit::Months => add_months(anchor, *value),
        },
    }
}

fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX)
}

fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

/// Due queries over the subscription store
#[derive(Clone)]
pub struct DeliveryScheduler<S, R> {
    subscriptions: Arc<S>,
    reminders: Arc<R>,
}

impl<S, R> DeliveryScheduler<S, R>
where
    S: SubscriptionRepository,
    R: ReminderLogRepository,
{
    /// Create a new scheduler over the given repositories
    pub fn new(subscriptions: Arc<S>, reminders: Arc<R>) -> Self {
        Self {
            subscriptions,
            reminders,
        }
    }

    /// Active subscriptions due for a reminder: delivery in exactly
    /// `lead_days`, with no reminder recorded yet for that cycle.
    ///
    /// Idempotent under repeated invocation; the reminder log filter is what
    /// keeps a twice-daily scheduler from double-sending.
    pub async fn find_due_for_reminder(
        &self,
        now: NaiveDate,
        lead_days: u32,
    ) -> Result<Vec<Subscription>, LifecycleError> {
        let target = add_days(now, u64::from(lead_days));
        let rows = self.subscriptions.find_active_due_on(target).await?;

        let mut due = Vec::with_capacity(rows.len());
        for row in rows {
            if self.reminders.exists(row.id, row.next_delivery_date).await? {
                continue;
            }
            due.push(row.to_domain()?);
        }

        Ok(due)
    }

    /// Active subscriptions whose delivery date has arrived
    pub async fn find_due_for_materialization(
        &self,
        now: NaiveDate,
    ) -> Result<Vec<Subscription>, LifecycleError> {
        let rows = self.subscriptions.find_active_due_by(now).await?;
        rows.iter().map(|row| Ok(row.to_domain()?)).collect()
    }

    /// Return paused subscriptions whose pause window has elapsed to Active.
    ///
    /// The next delivery date is recomputed from `now` so a long pause does
    /// not produce a burst of overdue deliveries. Returns how many
    /// subscriptions this pass resumed.
    pub async fn resume_elapsed_pauses(&self, now: NaiveDate) -> Result<u32, LifecycleError> {
        let rows = self.subscriptions.find_paused_elapsed(now).await?;

        let mut resumed = 0;
        for row in rows {
            let sub = row.to_domain()?;
            let fresh = next_delivery_date(&sub.frequency, now);
            if self.subscriptions.resume(row.id, fresh).await? {
                tracing::info!(
                    subscription_id = %sub.id,
                    next_delivery_date = %fresh,
                    "Pause elapsed, subscription resumed"
                );
                resumed += 1;
            }
        }

        Ok(resumed)
    }
}

impl<S, R> std::fmt::Debug for DeliveryScheduler<S, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryScheduler").finish_non_exhaustive()
    }
}
