//! Notify - daily check-in reminders over web push
//!
//! This crate provides:
//! - The reminder table and due-reminder lookup in a configured timezone
//! - A push provider seam with an HTTP implementation
//! - Broadcast to every subscriber with dead-endpoint pruning
//! - A minute-tick scheduler for long-running reminder delivery

pub mod broadcast;
pub mod error;
pub mod push;
pub mod reminder;
pub mod scheduler;

// Re-exports
pub use broadcast::{broadcast, BroadcastReport};
pub use error::{DeliveryError, NotifyError};
pub use push::{HttpPushProvider, PushProvider};
pub use reminder::{
    due_at, next_after, parse_timezone, Reminder, ReminderMessage, DEFAULT_TIMEZONE, REMINDERS,
};
pub use scheduler::ReminderScheduler;
