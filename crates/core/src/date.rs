//! Calendar date keys for day-scoped form state

use chrono::{Datelike, Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FieldError;

/// A calendar date with no time component
///
/// Every saved day is addressed by one of these. The backend knows the
/// day by its short wire key (`"10/19"`), the CLI by ISO form (`2026-10-19`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Wrap a calendar date
    pub const fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Today in the local timezone
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    /// Build from year/month/day, `None` when the date does not exist
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Move forward (positive) or backward (negative) by whole days
    ///
    /// Saturates at the calendar bounds instead of overflowing.
    pub fn shift(self, days: i64) -> Self {
        let magnitude = Days::new(days.unsigned_abs());
        let shifted = if days >= 0 {
            self.0.checked_add_days(magnitude)
        } else {
            self.0.checked_sub_days(magnitude)
        };
        Self(shifted.unwrap_or(self.0))
    }

    /// Key sent to the backend as `clientDateKey` (month/day, unpadded)
    pub fn wire_key(&self) -> String {
        format!("{}/{}", self.0.month(), self.0.day())
    }

    /// Long human form, e.g. "Monday, October 19, 2026"
    pub fn display_long(&self) -> String {
        self.0.format("%A, %B %-d, %Y").to_string()
    }

    /// The underlying calendar date
    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for DateKey {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed {
            "today" => return Ok(Self::today()),
            "yesterday" => return Ok(Self::today().shift(-1)),
            _ => {}
        }

        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .map(Self)
            .map_err(|_| FieldError::InvalidDate(s.to_string()))
    }
}
