//! Long-running reminder delivery
//!
//! Wakes on a fixed interval shorter than a minute, checks whether the
//! local minute has a reminder and broadcasts it at most once per day.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use journal::SubscriptionStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::broadcast::{broadcast, BroadcastReport};
use crate::push::PushProvider;
use crate::reminder::{due_at, Reminder};

/// Default wake-up period; must stay below one minute
pub const DEFAULT_TICK: Duration = Duration::from_secs(20);

/// Reminder loop over one subscription store
pub struct ReminderScheduler {
    store: SubscriptionStore,
    provider: Arc<dyn PushProvider>,
    timezone: Tz,
    period: Duration,
    /// Last reminder sent, so one minute never fires twice
    last_sent: Option<(NaiveDate, &'static str)>,
}

impl ReminderScheduler {
    pub fn new(store: SubscriptionStore, provider: Arc<dyn PushProvider>, timezone: Tz) -> Self {
        Self {
            store,
            provider,
            timezone,
            period: DEFAULT_TICK,
            last_sent: None,
        }
    }

    /// Override the wake-up period
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Send the reminder due at `now`, if any and not sent yet
    pub async fn tick(&mut self, now: DateTime<Utc>) -> Result<Option<(&'static Reminder, BroadcastReport)>> {
        let local = now.with_timezone(&self.timezone);
        let Some(reminder) = due_at(&local) else {
            return Ok(None);
        };

        let key = (local.date_naive(), reminder.section);
        if self.last_sent == Some(key) {
            return Ok(None);
        }

        debug!("Reminder {} due at {}", reminder.label(), local);
        // Deliveries are out before pruning can fail; never resend this minute.
        self.last_sent = Some(key);
        let report = broadcast(&self.store, self.provider.as_ref(), &reminder.message()).await?;
        Ok(Some((reminder, report)))
    }

    /// Run until the task is dropped
    pub async fn run(mut self) -> Result<()> {
        let mut timer = interval(self.period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Starting reminder loop in {:?} (tick: {:?})",
            self.timezone, self.period
        );

        loop {
            timer.tick().await;

            match self.tick(Utc::now()).await {
                Ok(Some((reminder, report))) => {
                    info!(
                        "Reminder {} delivered to {} subscribers",
                        reminder.label(),
                        report.delivered
                    );
                }
                Ok(None) => {}
                Err(e) => warn!("Reminder delivery failed: {}", e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeliveryError;
    use crate::reminder::{parse_timezone, ReminderMessage};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use journal::Subscription;
    use parking_lot::Mutex;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingProvider {
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PushProvider for RecordingProvider {
        async fn deliver(
            &self,
            _subscription: &Subscription,
            message: &ReminderMessage,
        ) -> Result<(), DeliveryError> {
            self.sent.lock().push(message.section.clone());
            Ok(())
        }
    }

    /// Reports every endpoint gone and leaves the store directory unwritable
    struct GoneBreakingStore {
        store_dir: PathBuf,
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl PushProvider for GoneBreakingStore {
        async fn deliver(
            &self,
            _subscription: &Subscription,
            _message: &ReminderMessage,
        ) -> Result<(), DeliveryError> {
            *self.calls.lock() += 1;
            // A plain file where the directory was makes the prune write fail.
            let _ = std::fs::remove_dir_all(&self.store_dir);
            let _ = std::fs::write(&self.store_dir, b"");
            Err(DeliveryError::Gone)
        }
    }

    fn scheduler(dir: &TempDir, provider: Arc<RecordingProvider>) -> ReminderScheduler {
        let store = SubscriptionStore::new(dir.path());
        store.add(Subscription::new("https://p/a")).unwrap();
        ReminderScheduler::new(store, provider, parse_timezone("America/Los_Angeles").unwrap())
    }

    #[tokio::test]
    async fn test_fires_once_per_minute() {
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(RecordingProvider::default());
        let mut scheduler = scheduler(&dir, provider.clone());

        // 04:30 UTC on Oct 20 is 21:30 PDT on Oct 19.
        let at = Utc.with_ymd_and_hms(2026, 10, 20, 4, 30, 5).unwrap();
        let (reminder, report) = scheduler.tick(at).await.unwrap().unwrap();
        assert_eq!(reminder.section, "daily");
        assert_eq!(report.delivered, 1);

        let again = at + chrono::Duration::seconds(20);
        assert!(scheduler.tick(again).await.unwrap().is_none());
        assert_eq!(*provider.sent.lock(), ["daily"]);
    }

    #[tokio::test]
    async fn test_quiet_outside_reminder_minutes() {
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(RecordingProvider::default());
        let mut scheduler = scheduler(&dir, provider.clone());

        let at = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        assert!(scheduler.tick(at).await.unwrap().is_none());
        assert!(provider.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn test_next_day_fires_again() {
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(RecordingProvider::default());
        let mut scheduler = scheduler(&dir, provider.clone());

        let day_one = Utc.with_ymd_and_hms(2026, 10, 19, 15, 0, 0).unwrap();
        scheduler.tick(day_one).await.unwrap();
        scheduler.tick(day_one + chrono::Duration::days(1)).await.unwrap();
        assert_eq!(*provider.sent.lock(), ["morning", "morning"]);
    }

    #[tokio::test]
    async fn test_failed_prune_does_not_resend() {
        let dir = TempDir::new().unwrap();
        let store_dir = dir.path().join("data");
        let store = SubscriptionStore::new(&store_dir);
        store.add(Subscription::new("https://p/a")).unwrap();

        let provider = Arc::new(GoneBreakingStore {
            store_dir: store_dir.clone(),
            calls: Mutex::new(0),
        });
        let tz = parse_timezone("America/Los_Angeles").unwrap();
        let mut scheduler = ReminderScheduler::new(store, provider.clone(), tz);

        let at = Utc.with_ymd_and_hms(2026, 10, 20, 4, 30, 0).unwrap();
        assert!(scheduler.tick(at).await.is_err());

        // Directory restored; the same minute must stay quiet.
        std::fs::remove_file(&store_dir).unwrap();
        let again = at + chrono::Duration::seconds(20);
        assert!(scheduler.tick(again).await.unwrap().is_none());
        assert_eq!(*provider.calls.lock(), 1);
    }
}
