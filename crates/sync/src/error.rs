//! Failure outcome for backend requests

use std::time::Duration;
use thiserror::Error;

/// Every way a backend request can fail
///
/// "No data for this date" is not an error; see [`crate::FetchOutcome`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Backend URL unset or still a placeholder
    #[error("backend URL is not configured")]
    NotConfigured,

    /// No response within the request deadline
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection or transport failure
    #[error("network error: {0}")]
    Network(String),

    /// Backend answered with an error status
    #[error("backend returned HTTP {0}")]
    Status(u16),

    /// Body could not be read as JSON
    #[error("unreadable response: {0}")]
    Malformed(String),
}

impl SyncError {
    /// Short hint appended to failure status lines
    pub fn hint(&self) -> &'static str {
        match self {
            SyncError::NotConfigured => "Set backend.url first (habit config --set backend.url <url>)",
            SyncError::Timeout(_) => "the backend did not answer in time",
            SyncError::Network(_) | SyncError::Status(_) | SyncError::Malformed(_) => {
                "check the backend deployment"
            }
        }
    }
}
