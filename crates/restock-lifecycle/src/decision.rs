//! Customer decision processing
//!
//! Applies a confirm/pause/cancel decision against a valid token. Action
//! validation happens before any mutation; the token consumption itself is
//! the atomic step that makes re-submission fail with "already processed".

use chrono::{DateTime, NaiveDate, Utc};
use restock_db::{SubscriptionRepository, TokenRepository};
use restock_types::{DecisionAction, Subscription, SubscriptionId};
use std::sync::Arc;

use crate::providers::Catalog;
use crate::token::TokenManager;
use crate::LifecycleError;

/// What the confirmation screen renders, keyed by token possession alone
#[derive(Debug, Clone)]
pub struct ConfirmationDetails {
    /// Subscription the token is bound to
    pub subscription_id: SubscriptionId,
    /// Product display name
    pub product_name: String,
    /// Product image, if the catalog has one
    pub product_image_url: Option<String>,
    /// The cycle's scheduled delivery date
    pub scheduled_date: NaiveDate,
    /// Cadence label, e.g. "Monthly"
    pub frequency_label: String,
    /// Units in the delivery
    pub quantity: u32,
    /// Total in cents at the creation-time discount, if the catalog can
    /// price the product right now
    pub total_cents: Option<i64>,
    /// Token validity window has passed
    pub is_expired: bool,
    /// A decision was already recorded against this token
    pub is_already_processed: bool,
}

/// Result of a processed decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionOutcome {
    /// Subscription the decision applied to
    pub subscription_id: SubscriptionId,
    /// The recorded action
    pub action: DecisionAction,
}

/// Processes customer decisions submitted through confirmation links
#[derive(Clone)]
pub struct DecisionProcessor<S, T> {
    subscriptions: Arc<S>,
    tokens: TokenManager<T>,
    catalog: Arc<dyn Catalog>,
}

impl<S, T> DecisionProcessor<S, T>
where
    S: SubscriptionRepository,
    T: TokenRepository,
{
    /// Create a new decision processor
    pub fn new(subscriptions: Arc<S>, tokens: TokenManager<T>, catalog: Arc<dyn Catalog>) -> Self {
        Self {
            subscriptions,
            tokens,
            catalog,
        }
    }

    /// Fetch what the confirmation screen shows for a token.
    ///
    /// Read-only: expired and already-processed tokens come back as flags so
    /// the screen can explain itself, not as errors. Only an unknown token
    /// is an error.
    pub async fn confirmation_details(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<ConfirmationDetails, LifecycleError> {
        let row = self.tokens.inspect(token).await?;
        let sub = self.load_subscription(row.subscription_id()).await?;

        let summary = self.catalog.product_summary(sub.product_id).await?;

        // Pricing is best-effort here; the screen still renders if the
        // catalog cannot quote right now.
        let total_cents = match self.catalog.orderable_snapshot(sub.product_id).await {
            Ok(snapshot) => Some(
                restock_types::discounted_unit_price_cents(
                    snapshot.unit_price_cents,
                    sub.discount_percent,
                ) * i64::from(sub.quantity),
            ),
            Err(e) => {
                tracing::warn!(product_id = %sub.product_id, error = %e, "Catalog quote unavailable");
                None
            }
        };

        Ok(ConfirmationDetails {
            subscription_id: sub.id,
            product_name: summary.name,
            product_image_url: summary.image_url,
            scheduled_date: row.cycle_date,
            frequency_label: sub.frequency.label(),
            quantity: sub.quantity,
            total_cents,
            is_expired: row.is_expired(now),
            is_already_processed: row.is_consumed(),
        })
    }

    /// Process a decision against a token.
    ///
    /// `pause_until` is required iff the action is Pause and must be
    /// strictly after `now`; validation rejects before any mutation.
    pub async fn process(
        &self,
        token: &str,
        action: DecisionAction,
        pause_until: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> Result<DecisionOutcome, LifecycleError> {
        let pause_until = validate_pause_date(action, pause_until, now)?;

        // Reject decisions against a cancelled subscription without burning
        // the token; the link is dead information at that point.
        let row = self.tokens.inspect(token).await?;
        let sub = self.load_subscription(row.subscription_id()).await?;
        if sub.state.is_terminal() {
            return Err(LifecycleError::InvalidAction(
                "subscription has been cancelled".to_string(),
            ));
        }

        // The one atomic step: first consumer wins, everyone else gets
        // NotFound / Expired / AlreadyProcessed.
        let row = self.tokens.consume(token, action, now).await?;
        let subscription_id = row.subscription_id();

        match action {
            DecisionAction::Continue => {
                // Materialization proceeds at the due date; nothing to change.
            }
            DecisionAction::Pause => {
                let until = pause_until.ok_or_else(|| {
                    LifecycleError::InvalidAction("pause requires a pause_until date".to_string())
                })?;
                self.subscriptions.set_paused(subscription_id.0, until).await?;
            }
            DecisionAction::Cancel => {
                self.subscriptions.set_cancelled(subscription_id.0).await?;
            }
        }

        tracing::info!(
            subscription_id = %subscription_id,
            action = %action,
            cycle_date = %row.cycle_date,
            "Decision processed"
        );

        Ok(DecisionOutcome {
            subscription_id,
            action,
        })
    }

    async fn load_subscription(
        &self,
        id: SubscriptionId,
    ) -> Result<Subscription, LifecycleError> {
        let row = self
            .subscriptions
            .find_by_id(id.0)
            .await?
            .ok_or(LifecycleError::SubscriptionNotFound)?;
        Ok(row.to_domain()?)
    }
}

impl<S, T> std::fmt::Debug for DecisionProcessor<S, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionProcessor").finish_non_exhaustive()
    }
}

/// Check the pause date rules before anything mutates.
///
/// Pause requires a date strictly after "now"; the other actions must not
/// carry one silently, so a stray date is simply ignored for them.
fn validate_pause_date(
    action: DecisionAction,
    pause_until: Option<NaiveDate>,
    now: DateTime<Utc>,
) -> Result<Option<NaiveDate>, LifecycleError> {
    match action {
        DecisionAction::Pause => {
            let until = pause_until.ok_or_else(|| {
                LifecycleError::InvalidAction("pause requires a pause_until date".to_string())
            })?;
            if until <= now.date_naive() {
                return Err(LifecycleError::InvalidAction(
                    "pause_until must be a future date".to_string(),
                ));
            }
            Ok(Some(until))
        }
        DecisionAction::Continue | DecisionAction::Cancel => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_pause_requires_date() {
        let now = "2026-01-29T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        assert!(matches!(
            validate_pause_date(DecisionAction::Pause, None, now),
            Err(LifecycleError::InvalidAction(_))
        ));
    }

    #[test]
    fn test_pause_date_must_be_strictly_future() {
        let now = "2026-01-29T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        assert!(matches!(
            validate_pause_date(DecisionAction::Pause, Some(date(2026, 1, 29)), now),
            Err(LifecycleError::InvalidAction(_))
        ));
        assert!(matches!(
            validate_pause_date(DecisionAction::Pause, Some(date(2026, 1, 28)), now),
            Err(LifecycleError::InvalidAction(_))
        ));
        assert_eq!(
            validate_pause_date(DecisionAction::Pause, Some(date(2026, 1, 30)), now).unwrap(),
            Some(date(2026, 1, 30))
        );
    }

    #[test]
    fn test_stray_pause_date_ignored_for_other_actions() {
        let now = "2026-01-29T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(
            validate_pause_date(DecisionAction::Cancel, Some(date(2026, 1, 1)), now).unwrap(),
            None
        );
        assert_eq!(
            validate_pause_date(DecisionAction::Continue, None, now).unwrap(),
            None
        );
    }
}
