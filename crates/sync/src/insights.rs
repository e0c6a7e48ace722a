//! Habit insights and their short-lived cache

use parking_lot::Mutex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};

use crate::response::value_to_string;
use crate::SyncError;

/// How long fetched insights stay fresh
pub const INSIGHTS_TTL: Duration = Duration::from_secs(5 * 60);

/// Completion statistics for one habit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitInsight {
    #[serde(default)]
    pub label: String,
    /// Share of days done, preformatted by the backend ("80%")
    #[serde(default = "zero_percent", deserialize_with = "lenient_string")]
    pub completion_display: String,
    /// Consecutive days done up to today
    #[serde(default)]
    pub current_streak: u32,
}

/// Average of the well-being field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageWellbeing {
    #[serde(default = "zero_average", deserialize_with = "lenient_string")]
    pub display: String,
    /// Days that had a value
    #[serde(default)]
    pub count: u32,
}

impl Default for AverageWellbeing {
    fn default() -> Self {
        Self {
            display: zero_average(),
            count: 0,
        }
    }
}

/// Body of a `getInsights` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    pub habits: Vec<HabitInsight>,
    #[serde(default)]
    pub average_wellbeing: AverageWellbeing,
}

fn zero_percent() -> String {
    "0%".to_string()
}

fn zero_average() -> String {
    "0.0".to_string()
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_string(&value).unwrap_or_default())
}

/// Parse a `getInsights` body
///
/// `None` when the backend has nothing to report (no `ok: true` or no
/// `habits` array).
pub fn parse_insights(body: &str) -> Result<Option<Insights>, SyncError> {
    let json: Value =
        serde_json::from_str(body.trim()).map_err(|e| SyncError::Malformed(e.to_string()))?;

    let ok = json.get("ok").and_then(Value::as_bool) == Some(true);
    let has_habits = json.get("habits").map(Value::is_array).unwrap_or(false);
    if !ok || !has_habits {
        return Ok(None);
    }

    serde_json::from_value(json)
        .map(Some)
        .map_err(|e| SyncError::Malformed(e.to_string()))
}

/// Single-entry cache of the last insights fetch
pub struct InsightsCache {
    ttl: Duration,
    entry: Mutex<Option<(Instant, Insights)>>,
}

impl InsightsCache {
    /// Cache holding entries for `ttl`
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: Mutex::new(None),
        }
    }

    /// Cached insights if still fresh
    pub fn get(&self) -> Option<Insights> {
        let entry = self.entry.lock();
        match entry.as_ref() {
            Some((cached_at, insights)) if cached_at.elapsed() < self.ttl => Some(insights.clone()),
            _ => None,
        }
    }

    /// Store a fresh result
    pub fn put(&self, insights: Insights) {
        *self.entry.lock() = Some((Instant::now(), insights));
    }

    /// Drop the cached entry
    pub fn invalidate(&self) {
        *self.entry.lock() = None;
    }
}

impl Default for InsightsCache {
    fn default() -> Self {
        Self::new(INSIGHTS_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "ok": true,
        "habits": [
            {"label": "Meditate", "completionDisplay": "80%", "currentStreak": 4},
            {"label": "Workout", "completionDisplay": 55.5}
        ],
        "averageWellbeing": {"display": "7.2", "count": 12}
    }"#;

    #[test]
    fn test_parse_insights() {
        let insights = parse_insights(BODY).unwrap().unwrap();
        assert_eq!(insights.habits.len(), 2);
        assert_eq!(insights.habits[0].completion_display, "80%");
        assert_eq!(insights.habits[0].current_streak, 4);
        assert_eq!(insights.habits[1].completion_display, "55.5");
        assert_eq!(insights.habits[1].current_streak, 0);
        assert_eq!(insights.average_wellbeing.display, "7.2");
        assert_eq!(insights.average_wellbeing.count, 12);
    }

    #[test]
    fn test_parse_insights_without_data() {
        assert_eq!(parse_insights(r#"{"ok":false}"#).unwrap(), None);
        assert_eq!(parse_insights(r#"{"ok":true,"habits":{}}"#).unwrap(), None);
        assert!(parse_insights("not json").is_err());
    }

    #[test]
    fn test_missing_average_uses_defaults() {
        let insights = parse_insights(r#"{"ok":true,"habits":[]}"#).unwrap().unwrap();
        assert!(insights.habits.is_empty());
        assert_eq!(insights.average_wellbeing, AverageWellbeing::default());
    }

    #[test]
    fn test_cache_freshness() {
        let insights = parse_insights(BODY).unwrap().unwrap();

        let cache = InsightsCache::default();
        assert!(cache.get().is_none());
        cache.put(insights.clone());
        assert_eq!(cache.get(), Some(insights.clone()));
        cache.invalidate();
        assert!(cache.get().is_none());

        let expired = InsightsCache::new(Duration::ZERO);
        expired.put(insights);
        assert!(expired.get().is_none());
    }
}
