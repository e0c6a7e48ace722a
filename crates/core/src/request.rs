//! Save requests and day snapshots exchanged with the backend

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::date::DateKey;

/// Name of the form parameter carrying the target date
pub const DATE_PARAM: &str = "clientDateKey";

/// Which slice of the form a save carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SaveKind {
    /// Only the core habit fields
    Habits,
    /// Every field of the day
    FullDay,
}

impl SaveKind {
    /// Message shown when the payload would be empty
    pub fn empty_message(&self) -> &'static str {
        match self {
            SaveKind::Habits => "Select at least one habit before saving.",
            SaveKind::FullDay => "Select or enter at least one field before saving.",
        }
    }
}

/// Why a save was started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaveReason {
    /// Debounce timer expired after edits
    Autosave,
    /// Explicit "save habits" action
    Button,
    /// Form submit
    Submit,
}

/// One outgoing save
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRequest {
    /// Day the values belong to
    pub date: DateKey,
    /// Slice of the form
    pub kind: SaveKind,
    /// Non-empty field values keyed by name
    pub payload: BTreeMap<String, String>,
}

impl SaveRequest {
    /// URL-encoded body pairs: every payload field plus the date key
    pub fn form_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .payload
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        pairs.push((DATE_PARAM.to_string(), self.date.wire_key()));
        pairs
    }
}

/// Saved values for one day as reported by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySnapshot {
    /// Field values keyed by name
    pub values: BTreeMap<String, String>,
    /// Derived score of the day, as sent by the backend
    pub score: Option<String>,
}

impl DaySnapshot {
    /// Snapshot with the given values and no score
    pub fn from_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            score: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_pairs_append_date_key() {
        let request = SaveRequest {
            date: DateKey::from_ymd(2026, 10, 19).unwrap(),
            kind: SaveKind::Habits,
            payload: BTreeMap::from([
                ("meditate".to_string(), "1".to_string()),
                ("workout".to_string(), "0".to_string()),
            ]),
        };

        let pairs = request.form_pairs();
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[2], ("clientDateKey".to_string(), "10/19".to_string()));
        assert!(pairs.contains(&("meditate".to_string(), "1".to_string())));
    }
}
