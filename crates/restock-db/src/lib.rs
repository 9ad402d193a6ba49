//! Restock DB - Store abstractions
//!
//! SQLx-based storage layer for the subscription lifecycle engine.
//!
//! # Example
//!
//! ```rust,ignore
//! use restock_db::{create_pool, Repositories};
//!
//! let pool = create_pool("postgres://localhost/restock").await?;
//! let repos = Repositories::new(pool);
//!
//! // Use repositories
//! let sub = repos.subscriptions.find_by_id(id).await?;
//! ```

pub mod error;
pub mod models;
pub mod pg;
pub mod pool;
pub mod repo;

pub use error::{DbError, DbResult};
pub use models::*;
pub use pg::Repositories;
pub use pool::{create_pool, DbPool};
pub use repo::*;
