//! Fixed-column spreadsheet row for one submission
//!
//! The backend appends one row per submission and never rewrites old rows.
//! Column order is part of the external contract:
//!
//! | # | column            |
//! |---|-------------------|
//! | 0 | timestamp (UTC)   |
//! | 1-10 | binary habits  |
//! | 11 | wellbeing        |
//! | 12 | notes            |

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::date::DateKey;

/// Binary habit columns, in sheet order
pub const HABIT_COLUMNS: [&str; 10] = [
    "wakeUpAt8",
    "sleep75Hours",
    "meditate",
    "workout",
    "workOnStudio",
    "consumeDrugs",
    "socialLimits",
    "stretch",
    "hairCare",
    "gratitudePrayer",
];

/// One appended row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRow {
    /// When the row was written
    pub submitted_at: DateTime<Utc>,
    /// Day the values belong to (not a sheet column)
    pub date: DateKey,
    /// Habit flags in [`HABIT_COLUMNS`] order
    pub habits: [u8; 10],
    /// Well-being score, if it parsed as a number
    pub wellbeing: Option<f64>,
    /// Trimmed notes
    pub notes: String,
}

impl DayRow {
    /// Build a row from submitted form values
    ///
    /// Habit values other than "1" count as not done. Missing fields produce
    /// empty cells rather than errors.
    pub fn from_payload(
        date: DateKey,
        payload: &BTreeMap<String, String>,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        let mut habits = [0u8; 10];
        for (slot, name) in habits.iter_mut().zip(HABIT_COLUMNS) {
            *slot = match payload.get(name).map(|v| v.trim()) {
                Some("1") => 1,
                _ => 0,
            };
        }

        let wellbeing = payload
            .get("wellbeing")
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|n| n.is_finite());

        let notes = payload
            .get("notes")
            .map(|v| v.trim().to_string())
            .unwrap_or_default();

        Self {
            submitted_at,
            date,
            habits,
            wellbeing,
            notes,
        }
    }

    /// Sheet header row
    pub fn header() -> Vec<String> {
        let mut header = vec!["timestamp".to_string()];
        header.extend(HABIT_COLUMNS.iter().map(|s| s.to_string()));
        header.push("wellbeing".to_string());
        header.push("notes".to_string());
        header
    }

    /// Cells in sheet order
    pub fn columns(&self) -> Vec<String> {
        let mut cells = Vec::with_capacity(13);
        cells.push(self.submitted_at.to_rfc3339_opts(SecondsFormat::Millis, true));
        cells.extend(self.habits.iter().map(|h| h.to_string()));
        cells.push(self.wellbeing.map(|w| w.to_string()).unwrap_or_default());
        cells.push(self.notes.clone());
        cells
    }

    /// Count of habits marked done
    pub fn habits_done(&self) -> usize {
        self.habits.iter().filter(|&&h| h == 1).count()
    }
}
