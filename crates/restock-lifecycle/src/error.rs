//! Lifecycle errors

use thiserror::Error;

use crate::providers::ProviderError;

/// Subscription lifecycle errors
#[derive(Error, Debug)]
pub enum LifecycleError {
    /// Confirmation token does not exist
    #[error("confirmation token not found")]
    TokenNotFound,

    /// Confirmation token's validity window has passed
    #[error("confirmation token expired")]
    TokenExpired,

    /// A decision was already recorded against this token
    #[error("decision already processed")]
    AlreadyProcessed,

    /// Rejected before any mutation, e.g. pause without a future date
    #[error("invalid action: {0}")]
    InvalidAction(String),

    /// A live token already exists for this delivery cycle.
    ///
    /// Internal guard; the reminder dispatcher resolves it by reusing the
    /// existing token, it is never surfaced to customers.
    #[error("a live token already exists for this cycle")]
    DuplicateCycle,

    /// Subscription does not exist
    #[error("subscription not found")]
    SubscriptionNotFound,

    /// Catalog or order-ledger collaborator failure; the affected cycle is
    /// deferred to the next scheduler pass
    #[error("collaborator failure: {0}")]
    Dependency(String),

    /// Database error
    #[error("database error: {0}")]
    Database(String),
}

impl LifecycleError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::TokenNotFound | Self::SubscriptionNotFound => 404,
            Self::TokenExpired => 410,
            Self::AlreadyProcessed => 409,
            Self::InvalidAction(_) => 400,
            Self::DuplicateCycle | Self::Dependency(_) | Self::Database(_) => 500,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::TokenNotFound => "INVALID_LINK",
            Self::TokenExpired => "LINK_EXPIRED",
            Self::AlreadyProcessed => "ALREADY_PROCESSED",
            Self::InvalidAction(_) => "INVALID_ACTION",
            Self::DuplicateCycle => "DUPLICATE_CYCLE",
            Self::SubscriptionNotFound => "SUBSCRIPTION_NOT_FOUND",
            Self::Dependency(_) => "DEPENDENCY_FAILURE",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<restock_db::DbError> for LifecycleError {
    fn from(err: restock_db::DbError) -> Self {
        tracing::error!("Database error: {}", err);
        Self::Database(err.to_string())
    }
}

impl From<ProviderError> for LifecycleError {
    fn from(err: ProviderError) -> Self {
        Self::Dependency(err.to_string())
    }
}
