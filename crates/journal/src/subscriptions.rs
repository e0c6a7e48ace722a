//! Push subscriptions persisted as a JSON array
//!
//! The file is rewritten whole on every change through a temporary file in
//! the same directory, so readers never observe a half-written list. A
//! missing or unreadable file reads as an empty list.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// One push endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Delivery URL; unique within the store
    pub endpoint: String,
    /// When the subscription was added
    #[serde(default, rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Everything else the subscriber sent (`keys`, `expirationTime`, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Subscription {
    /// New subscription stamped with the current time
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            created_at: Some(Utc::now()),
            extra: Map::new(),
        }
    }
}

/// JSON-file subscription store
#[derive(Debug, Clone)]
pub struct SubscriptionStore {
    path: PathBuf,
}

impl SubscriptionStore {
    /// Store backed by `subscriptions.json` in `dir`
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join("subscriptions.json"),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the directory and an empty list if missing
    pub fn ensure_file(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        if !self.path.exists() {
            self.write(&[])?;
        }
        Ok(())
    }

    /// All stored subscriptions
    pub fn list(&self) -> Vec<Subscription> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return Vec::new(),
        };
        match serde_json::from_str(&raw) {
            Ok(list) => list,
            Err(e) => {
                warn!("Ignoring unreadable {}: {}", self.path.display(), e);
                Vec::new()
            }
        }
    }

    /// Add a subscription unless its endpoint is already stored
    ///
    /// Returns whether the list changed.
    pub fn add(&self, subscription: Subscription) -> Result<bool> {
        let mut list = self.list();
        if list.iter().any(|s| s.endpoint == subscription.endpoint) {
            return Ok(false);
        }
        list.push(subscription);
        self.write(&list)?;
        Ok(true)
    }

    /// Remove one endpoint; returns whether it was stored
    pub fn remove(&self, endpoint: &str) -> Result<bool> {
        Ok(self.remove_endpoints(&[endpoint.to_string()])? > 0)
    }

    /// Remove every listed endpoint; returns how many were dropped
    pub fn remove_endpoints(&self, endpoints: &[String]) -> Result<usize> {
        if endpoints.is_empty() {
            return Ok(0);
        }
        let list = self.list();
        let before = list.len();
        let live: Vec<_> = list
            .into_iter()
            .filter(|s| !endpoints.contains(&s.endpoint))
            .collect();
        let removed = before - live.len();
        if removed > 0 {
            self.write(&live)?;
            debug!("Removed {} subscriptions", removed);
        }
        Ok(removed)
    }

    fn write(&self, list: &[Subscription]) -> Result<()> {
        let dir = self
            .path
            .parent()
            .context("Subscription file has no parent directory")?;
        fs::create_dir_all(dir)?;

        let json = serde_json::to_string_pretty(list)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_lists_empty() {
        let dir = TempDir::new().unwrap();
        let store = SubscriptionStore::new(&dir.path().join("data"));
        assert!(store.list().is_empty());

        store.ensure_file().unwrap();
        assert_eq!(fs::read_to_string(store.path()).unwrap().trim(), "[]");
    }

    #[test]
    fn test_add_deduplicates_by_endpoint() {
        let dir = TempDir::new().unwrap();
        let store = SubscriptionStore::new(dir.path());

        assert!(store.add(Subscription::new("https://push.example/a")).unwrap());
        assert!(!store.add(Subscription::new("https://push.example/a")).unwrap());
        assert!(store.add(Subscription::new("https://push.example/b")).unwrap());

        let endpoints: Vec<_> = store.list().into_iter().map(|s| s.endpoint).collect();
        assert_eq!(endpoints, ["https://push.example/a", "https://push.example/b"]);
    }

    #[test]
    fn test_remove_endpoints() {
        let dir = TempDir::new().unwrap();
        let store = SubscriptionStore::new(dir.path());
        for name in ["a", "b", "c"] {
            store.add(Subscription::new(format!("https://push.example/{name}"))).unwrap();
        }

        let dead = vec!["https://push.example/a".to_string(), "https://push.example/zz".to_string()];
        assert_eq!(store.remove_endpoints(&dead).unwrap(), 1);
        assert!(store.remove("https://push.example/c").unwrap());
        assert!(!store.remove("https://push.example/c").unwrap());

        let left = store.list();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].endpoint, "https://push.example/b");
    }

    #[test]
    fn test_corrupt_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = SubscriptionStore::new(dir.path());
        fs::write(store.path(), "{not json").unwrap();
        assert!(store.list().is_empty());

        // Writing again replaces the corrupt content.
        assert!(store.add(Subscription::new("https://push.example/a")).unwrap());
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_entries_without_timestamp_are_accepted() {
        let dir = TempDir::new().unwrap();
        let store = SubscriptionStore::new(dir.path());
        fs::write(store.path(), r#"[{"endpoint":"https://push.example/x","keys":{"auth":"k"}}]"#).unwrap();

        let list = store.list();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].created_at, None);
    }

    #[test]
    fn test_rewrites_keep_subscriber_keys() {
        let dir = TempDir::new().unwrap();
        let store = SubscriptionStore::new(dir.path());
        fs::write(
            store.path(),
            r#"[
                {"endpoint":"https://push.example/x","keys":{"p256dh":"P","auth":"A"}},
                {"endpoint":"https://push.example/gone","keys":{"p256dh":"Q","auth":"B"}}
            ]"#,
        )
        .unwrap();

        assert!(store.add(Subscription::new("https://push.example/y")).unwrap());
        assert!(store.remove("https://push.example/gone").unwrap());

        let raw: Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        let entries = raw.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["endpoint"], "https://push.example/x");
        assert_eq!(entries[0]["keys"]["p256dh"], "P");
        assert_eq!(entries[0]["keys"]["auth"], "A");
        assert!(entries[0].get("createdAt").is_none());
        assert_eq!(entries[1]["endpoint"], "https://push.example/y");
        assert!(entries[1].get("keys").is_none());
    }
}
