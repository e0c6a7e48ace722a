//! Daily reminder table
//!
//! Reminders are matched against the wall clock of the configured timezone
//! at minute granularity: a run at 08:00 local time sends the morning
//! check-in, any other minute sends nothing.

use chrono::{DateTime, Duration, TimeZone, Timelike};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::NotifyError;

/// Timezone used when none is configured
pub const DEFAULT_TIMEZONE: &str = "America/Los_Angeles";

/// One scheduled check-in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reminder {
    pub hour: u32,
    pub minute: u32,
    pub title: &'static str,
    pub body: &'static str,
    /// Form section the reminder points at
    pub section: &'static str,
}

/// Check-ins sent every day, in firing order
pub static REMINDERS: [Reminder; 2] = [
    Reminder {
        hour: 8,
        minute: 0,
        title: "8:00 AM Habit Check-In",
        body: "Wake up, sleep, meditate, workout.",
        section: "morning",
    },
    Reminder {
        hour: 21,
        minute: 30,
        title: "9:30 PM Habit Check-In",
        body: "Daily work, boundaries, wellbeing, and notes.",
        section: "daily",
    },
];

impl Reminder {
    /// Local time as "HH:MM"
    pub fn label(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }

    /// Whether `local` falls in this reminder's minute
    pub fn matches<T: Timelike>(&self, local: &T) -> bool {
        local.hour() == self.hour && local.minute() == self.minute
    }

    /// Push payload for this reminder
    pub fn message(&self) -> ReminderMessage {
        ReminderMessage {
            title: self.title.to_string(),
            body: self.body.to_string(),
            section: self.section.to_string(),
        }
    }
}

/// JSON body posted to each push endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderMessage {
    pub title: String,
    pub body: String,
    pub section: String,
}

impl ReminderMessage {
    /// Instant notification sent by a forced run
    pub fn test() -> Self {
        Self {
            title: "Instant Test Notification".to_string(),
            body: "This is a manual push test from the habit tracker.".to_string(),
            section: "test".to_string(),
        }
    }
}

/// Parse an IANA timezone name
pub fn parse_timezone(name: &str) -> Result<Tz, NotifyError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| NotifyError::InvalidTimezone(name.to_string()))
}

/// Reminder scheduled for the minute of `local`, if any
pub fn due_at<T: Timelike>(local: &T) -> Option<&'static Reminder> {
    REMINDERS.iter().find(|r| r.matches(local))
}

/// Next reminder strictly after `now`, with its local firing time
///
/// Local times skipped by a DST transition are passed over.
pub fn next_after(now: DateTime<Tz>) -> Option<(DateTime<Tz>, &'static Reminder)> {
    let tz = now.timezone();
    let today = now.date_naive();

    (0..=2)
        .filter_map(|offset| today.checked_add_signed(Duration::days(offset)))
        .flat_map(|day| REMINDERS.iter().map(move |r| (day, r)))
        .filter_map(|(day, r)| {
            let naive = day.and_hms_opt(r.hour, r.minute, 0)?;
            let at = tz.from_local_datetime(&naive).earliest()?;
            (at > now).then_some((at, r))
        })
        .min_by_key(|(at, _)| *at)
}
