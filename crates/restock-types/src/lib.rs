//! Restock Types - Shared domain types
//!
//! This crate contains domain types used across Restock services:
//! - Customer and product identity
//! - Subscription cadence and lifecycle state
//! - Order snapshots produced by materialization

pub mod customer;
pub mod frequency;
pub mod order;
pub mod product;
pub mod subscription;

pub use customer::*;
pub use frequency::*;
pub use order::*;
pub use product::*;
pub use subscription::*;
