//! Confirmation token management
//!
//! Tokens are single-use credentials bound to one delivery cycle
//! (subscription, scheduled date). Issuance refuses to mint a second live
//! token for a cycle; consumption is an atomic conditional update at the
//! storage layer, so concurrent redemptions yield exactly one success.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, NaiveDate, Utc};
use rand::RngCore;
use restock_db::{CreateToken, TokenRepository, TokenRow};
use restock_types::{DecisionAction, SubscriptionId};
use std::sync::Arc;

use crate::{LifecycleConfig, LifecycleError};

/// Number of random bytes in a token (before base64 encoding)
const TOKEN_BYTES: usize = 32;

/// Issues, validates, and consumes single-use confirmation tokens
#[derive(Clone)]
pub struct TokenManager<T> {
    repo: Arc<T>,
    config: LifecycleConfig,
}

impl<T: TokenRepository> TokenManager<T> {
    /// Create a new token manager
    pub fn new(repo: Arc<T>, config: LifecycleConfig) -> Self {
        Self { repo, config }
    }

    /// Issue a token for a delivery cycle.
    ///
    /// Fails with [`LifecycleError::DuplicateCycle`] if a live token already
    /// exists for the same (subscription, date) pair; callers that just need
    /// a usable token should call [`Self::issue_or_reuse`].
    pub async fn issue(
        &self,
        subscription_id: SubscriptionId,
        cycle_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<TokenRow, LifecycleError> {
        if self
            .repo
            .find_live_for_cycle(subscription_id.0, cycle_date, now)
            .await?
            .is_some()
        {
            return Err(LifecycleError::DuplicateCycle);
        }

        let row = self
            .repo
            .create(CreateToken {
                token: generate_token(),
                subscription_id: subscription_id.0,
                cycle_date,
                issued_at: now,
                expires_at: self.config.token_expires_at(cycle_date),
            })
            .await?;

        tracing::debug!(
            subscription_id = %subscription_id,
            cycle_date = %cycle_date,
            expires_at = %row.expires_at,
            "Confirmation token issued"
        );

        Ok(row)
    }

    /// Issue a token for a cycle, or return the live one already minted.
    ///
    /// Reminder retries land here: the customer's previously emailed link
    /// must stay valid, so a duplicate cycle resolves to the existing token.
    pub async fn issue_or_reuse(
        &self,
        subscription_id: SubscriptionId,
        cycle_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<TokenRow, LifecycleError> {
        match self.issue(subscription_id, cycle_date, now).await {
            Err(LifecycleError::DuplicateCycle) => self
                .repo
                .find_live_for_cycle(subscription_id.0, cycle_date, now)
                .await?
                .ok_or(LifecycleError::TokenNotFound),
            other => other,
        }
    }

    /// Look up a token without judging its validity.
    ///
    /// Used by the confirmation details screen, which renders expired and
    /// already-processed tokens as flags rather than errors.
    pub async fn inspect(&self, token: &str) -> Result<TokenRow, LifecycleError> {
        self.repo
            .find_by_token(token)
            .await?
            .ok_or(LifecycleError::TokenNotFound)
    }

    /// Validate a token for redemption. Read-only and side-effect-free.
    pub async fn validate(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenRow, LifecycleError> {
        let row = self.inspect(token).await?;
        classify(&row, now)?;
        Ok(row)
    }

    /// Atomically consume a token, recording the resulting action.
    ///
    /// Exactly-once: the storage layer's conditional update decides the
    /// winner, and every loser gets the error the token's state deserves.
    pub async fn consume(
        &self,
        token: &str,
        action: DecisionAction,
        now: DateTime<Utc>,
    ) -> Result<TokenRow, LifecycleError> {
        if self.repo.consume(token, &action.to_string(), now).await? {
            return self.inspect(token).await;
        }

        // Lost the conditional update; classify why
        let row = self.inspect(token).await?;
        match classify(&row, now) {
            Err(e) => Err(e),
            // The token looked live but the update missed: a concurrent
            // redemption won between our update and this read.
            Ok(()) => Err(LifecycleError::AlreadyProcessed),
        }
    }
}

impl<T> std::fmt::Debug for TokenManager<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Generate an unguessable URL-safe token string
fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Why a token cannot be redeemed, if it cannot.
///
/// Consumed wins over expired: a customer double-clicking a stale link
/// should see "already processed", not "expired".
fn classify(row: &TokenRow, now: DateTime<Utc>) -> Result<(), LifecycleError> {
    if row.is_consumed() {
        return Err(LifecycleError::AlreadyProcessed);
    }
    if row.is_expired(now) {
        return Err(LifecycleError::TokenExpired);
    }
    Ok(())
}
