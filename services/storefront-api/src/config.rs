//! Configuration for the Storefront API service.

use restock_lifecycle::LifecycleConfig;
use std::time::Duration;

/// Storefront API configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub http_port: u16,
    /// Database URL
    pub database_url: String,
    /// Catalog collaborator base URL
    pub catalog_url: String,
    /// Notification transport base URL
    pub notification_url: String,
    /// Order ledger base URL
    pub order_ledger_url: String,
    /// Lifecycle engine configuration
    pub lifecycle: LifecycleConfig,
    /// Request timeout
    pub request_timeout: Duration,
    /// Metrics enabled
    pub metrics_enabled: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Database
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        // Server port
        let http_port = std::env::var("HTTP_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("HTTP_PORT"))?;

        // Collaborator endpoints
        let catalog_url =
            std::env::var("CATALOG_URL").map_err(|_| ConfigError::Missing("CATALOG_URL"))?;

        let notification_url = std::env::var("NOTIFICATION_URL")
            .map_err(|_| ConfigError::Missing("NOTIFICATION_URL"))?;

        let order_ledger_url = std::env::var("ORDER_LEDGER_URL")
            .map_err(|_| ConfigError::Missing("ORDER_LEDGER_URL"))?;

        // Reminder lead time
        let lead_days: u32 = std::env::var("LEAD_DAYS")
            .unwrap_or_else(|_| "3".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("LEAD_DAYS"))?;

        // Token grace past the cycle date's midnight. Keep at or below the
        // hour the materialization trigger fires; see LifecycleConfig.
        let token_grace_hours: i64 = std::env::var("TOKEN_GRACE_HOURS")
            .unwrap_or_else(|_| "0".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("TOKEN_GRACE_HOURS"))?;

        // Base URL for confirmation links
        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "https://shop.example.com".to_string());

        // Request timeout
        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("REQUEST_TIMEOUT_SECS"))?;

        // Metrics
        let metrics_enabled = std::env::var("METRICS_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .unwrap_or(true);

        // Build lifecycle config
        let lifecycle = LifecycleConfig::new()
            .with_lead_days(lead_days)
            .with_token_grace_hours(token_grace_hours)
            .with_public_base_url(&public_base_url);

        Ok(Self {
            http_port,
            database_url,
            catalog_url,
            notification_url,
            order_ledger_url,
            lifecycle,
            request_timeout: Duration::from_secs(request_timeout_secs),
            metrics_enabled,
        })
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
