//! Remote sync for the habit backend
//!
//! This crate provides:
//! - The [`RemoteSync`] seam used by the form session
//! - An HTTP implementation with a fixed request deadline
//! - Response parsing that separates "nothing saved" from failures
//! - Habit insights with a short-lived cache

pub mod client;
pub mod error;
pub mod insights;
pub mod response;

use async_trait::async_trait;
use habit_core::{DateKey, DaySnapshot, SaveRequest};

// Re-exports
pub use client::{is_configured_url, HttpSyncClient, DEFAULT_TIMEOUT};
pub use error::SyncError;
pub use insights::{AverageWellbeing, HabitInsight, Insights, InsightsCache, INSIGHTS_TTL};

/// Result of loading one day
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The backend has values for the day
    Found(DaySnapshot),
    /// Nothing saved for the day
    NotFound,
}

/// Request/response channel to the backend
#[async_trait]
pub trait RemoteSync: Send + Sync {
    /// Persist one save request
    async fn send(&self, request: &SaveRequest) -> Result<(), SyncError>;

    /// Load the saved values of one day
    async fn fetch(&self, date: DateKey) -> Result<FetchOutcome, SyncError>;
}
