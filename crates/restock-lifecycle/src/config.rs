//! Lifecycle engine configuration

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

/// Lifecycle engine configuration
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    /// Days before a scheduled delivery at which the reminder goes out
    pub lead_days: u32,
    /// Hours past the cycle date's midnight (UTC) a token stays redeemable.
    ///
    /// Must not exceed the hour of day the materialization trigger fires:
    /// tokens expiring at or before materialization is what makes a
    /// redeemed-after-ordering race impossible.
    pub token_grace_hours: i64,
    /// Base URL embedded in confirmation links
    pub public_base_url: String,
}

impl LifecycleConfig {
    /// Create a config with default settings
    pub fn new() -> Self {
        Self {
            lead_days: 3,
            token_grace_hours: 0,
            public_base_url: "https://shop.example.com".to_string(),
        }
    }

    /// Set the reminder lead time in days
    pub fn with_lead_days(mut self, lead_days: u32) -> Self {
        self.lead_days = lead_days;
        self
    }

    /// Set the token grace window past the cycle date's midnight (UTC)
    pub fn with_token_grace_hours(mut self, hours: i64) -> Self {
        self.token_grace_hours = hours;
        self
    }

    /// Set the base URL used for confirmation links
    pub fn with_public_base_url(mut self, url: impl Into<String>) -> Self {
        self.public_base_url = url.into();
        self
    }

    /// When a token for the given delivery cycle stops being redeemable
    pub fn token_expires_at(&self, cycle_date: NaiveDate) -> DateTime<Utc> {
        cycle_date.and_time(NaiveTime::MIN).and_utc() + Duration::hours(self.token_grace_hours)
    }

    /// The single-use confirmation link for a token, with the default action hint
    pub fn confirmation_link(&self, token: &str) -> String {
        format!(
            "{}/confirm/{}?action=continue",
            self.public_base_url.trim_end_matches('/'),
            token
        )
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self::new()
    }
}
