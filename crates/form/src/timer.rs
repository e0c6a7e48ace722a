//! Timer capability injected into the form session

use async_trait::async_trait;
use std::time::Duration;

/// Source of delays for debounce timers
#[async_trait]
pub trait Timer: Send + Sync {
    /// Complete after `duration`
    async fn sleep(&self, duration: Duration);
}

/// Timer backed by the tokio clock
///
/// Under `tokio::time::pause()` this follows the paused clock, which is how
/// the session tests drive debounce windows deterministically.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

#[async_trait]
impl Timer for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
