//! Parsing of backend response bodies

use habit_core::DaySnapshot;
use serde_json::Value;

use crate::{FetchOutcome, SyncError};

/// Key the backend uses for the derived day score inside `values`
const SCORE_KEY: &str = "dayScore";

/// Parse the body of a `getToday` request
///
/// An empty body, or a JSON body that does not report saved values, means
/// nothing was saved for the date. Only a body that is not JSON at all is
/// an error.
pub fn parse_load_response(body: &str) -> Result<FetchOutcome, SyncError> {
    let body = body.trim();
    if body.is_empty() {
        return Ok(FetchOutcome::NotFound);
    }

    let json: Value =
        serde_json::from_str(body).map_err(|e| SyncError::Malformed(e.to_string()))?;

    let ok = json.get("ok").and_then(Value::as_bool) == Some(true);
    let exists = json.get("exists").and_then(Value::as_bool) == Some(true);
    let values = match json.get("values") {
        Some(Value::Object(map)) if ok && exists => map,
        _ => return Ok(FetchOutcome::NotFound),
    };

    let mut snapshot = DaySnapshot::default();
    for (name, value) in values {
        let Some(text) = value_to_string(value) else {
            continue;
        };
        if name == SCORE_KEY {
            snapshot.score = Some(text);
        } else {
            snapshot.values.insert(name.clone(), text);
        }
    }

    Ok(FetchOutcome::Found(snapshot))
}

/// Stringify a JSON scalar the way the form stores it
///
/// `null` and nested structures carry no form value.
pub(crate) fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
