//! Error types for reminder delivery

use thiserror::Error;

/// Failure to deliver one push message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// Endpoint answered 404 or 410: the subscription no longer exists
    #[error("subscription is gone")]
    Gone,

    /// Any other failure; the subscription is kept
    #[error("delivery failed: {0}")]
    Failed(String),
}

/// Reminder configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifyError {
    #[error("unknown timezone {0:?} (expected an IANA name like America/Los_Angeles)")]
    InvalidTimezone(String),
}
