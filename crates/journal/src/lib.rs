//! Local persistence for the habit tracker
//!
//! This crate provides:
//! - Submission ledger: append-only record of accepted saves (sled)
//! - Subscription store: push endpoints kept in a JSON file

pub mod ledger;
pub mod subscriptions;

// Re-exports
pub use ledger::{Ledger, LedgerEntry};
pub use subscriptions::{Subscription, SubscriptionStore};

/// Result type for journal operations
pub type Result<T> = anyhow::Result<T>;
