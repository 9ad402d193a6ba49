//! Restock Lifecycle - Recurring order subscription engine
//!
//! Core lifecycle functionality: delivery scheduling, confirmation token
//! management, reminder dispatch, customer decision processing, order
//! materialization, and operational statistics.
//!
//! # Example
//!
//! ```rust,ignore
//! use restock_lifecycle::{LifecycleConfig, ReminderDispatcher, OrderMaterializer};
//!
//! let config = LifecycleConfig::new()
//!     .with_lead_days(3)
//!     .with_public_base_url("https://shop.example.com");
//!
//! // Daily tick: remind customers, then materialize due cycles
//! let report = dispatcher.run(Utc::now()).await?;
//! let report = materializer.run(Utc::now()).await?;
//! ```

pub mod config;
pub mod decision;
pub mod error;
pub mod materialize;
pub mod providers;
pub mod reminder;
pub mod schedule;
pub mod stats;
pub mod token;

pub use config::LifecycleConfig;
pub use decision::{ConfirmationDetails, DecisionOutcome, DecisionProcessor};
pub use error::LifecycleError;
pub use materialize::{MaterializationReport, OrderMaterializer};
pub use providers::{
    Catalog, NotificationTransport, OrderLedger, ProductSnapshot, ProductSummary, ProviderError,
};
pub use reminder::{ReminderDispatcher, ReminderRunReport};
pub use schedule::{next_delivery_date, DeliveryScheduler};
pub use stats::{LifecycleStats, StatsAggregator};
pub use token::TokenManager;
