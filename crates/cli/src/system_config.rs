//! User configuration file
//!
//! Lives at `<config dir>/habit-tracker/config.toml`. Every key is optional;
//! missing keys take their defaults. `HABIT_BACKEND_URL`, `TIMEZONE` and
//! `HABIT_DATA_DIR` override the file, and `HABIT_CONFIG` points at a
//! different file altogether.

use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

const APP_DIR: &str = "habit-tracker";

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub backend: BackendConfig,
    pub autosave: AutosaveConfig,
    pub reminders: ReminderConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Deployment URL; empty or a `PASTE_` placeholder means unset
    pub url: String,
    /// Request deadline in seconds (1-60)
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: sync::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutosaveConfig {
    /// Quiet period after the last habit edit (50-10000)
    pub debounce_ms: u64,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            debounce_ms: form::DEFAULT_DEBOUNCE.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    /// IANA timezone the reminder times are read in
    pub timezone: String,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            timezone: notify::DEFAULT_TIMEZONE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Ledger and subscriptions directory (default: platform data dir)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl SystemConfig {
    /// Check every value against its allowed range
    pub fn validate(&self) -> Result<()> {
        if !(1..=60).contains(&self.backend.timeout_secs) {
            anyhow::bail!(
                "backend.timeout_secs must be 1-60 (got {})",
                self.backend.timeout_secs
            );
        }
        if !(50..=10_000).contains(&self.autosave.debounce_ms) {
            anyhow::bail!(
                "autosave.debounce_ms must be 50-10000 (got {})",
                self.autosave.debounce_ms
            );
        }
        notify::parse_timezone(&self.reminders.timezone)?;
        Ok(())
    }

    /// Apply environment overrides
    pub fn apply_env(&mut self) {
        if let Some(url) = env_value("HABIT_BACKEND_URL") {
            self.backend.url = url;
        }
        if let Some(tz) = env_value("TIMEZONE") {
            self.reminders.timezone = tz;
        }
        if let Some(dir) = env_value("HABIT_DATA_DIR") {
            self.storage.data_dir = Some(PathBuf::from(dir));
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.backend.timeout_secs)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.autosave.debounce_ms)
    }

    pub fn timezone(&self) -> Result<Tz> {
        Ok(notify::parse_timezone(&self.reminders.timezone)?)
    }

    /// Directory holding the ledger and subscriptions
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.storage.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_dir()
                .map(|d| d.join(APP_DIR))
                .context("Could not determine data directory; set storage.data_dir"),
        }
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Location of the config file
pub fn config_file_path() -> Option<PathBuf> {
    if let Some(path) = env_value("HABIT_CONFIG") {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}

/// Read the config file only, without environment overrides
pub fn load_file() -> Result<SystemConfig> {
    let path = config_file_path().context("Could not determine config file path")?;
    if !path.exists() {
        return Ok(SystemConfig::default());
    }

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Effective configuration: file, then environment, then validation
pub fn load() -> Result<SystemConfig> {
    let mut config = load_file()?;
    config.apply_env();
    config
        .validate()
        .context("Invalid configuration (see 'habit config --list')")?;
    Ok(config)
}

/// Write the config file, creating its directory
pub fn save(config: &SystemConfig) -> Result<()> {
    let path = config_file_path().context("Could not determine config file path")?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let raw = toml::to_string_pretty(config)?;
    fs::write(&path, raw).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Write a default config file unless one exists
pub fn init_if_missing() -> Result<PathBuf> {
    let path = config_file_path().context("Could not determine config file path")?;
    if !path.exists() {
        save(&SystemConfig::default())?;
    }
    Ok(path)
}

/// Annotated example configuration
pub fn example_config() -> String {
    format!(
        r#"# Habit tracker configuration
# Location: <config dir>/{APP_DIR}/config.toml

[backend]
# Deployment URL of the sheet backend (env: HABIT_BACKEND_URL)
url = "https://script.google.com/macros/s/PASTE_DEPLOYMENT_ID/exec"
# Request deadline in seconds (1-60)
timeout_secs = {timeout}

[autosave]
# Quiet period after the last habit edit, in milliseconds (50-10000)
debounce_ms = {debounce}

[reminders]
# IANA timezone for the 08:00 and 21:30 check-ins (env: TIMEZONE)
timezone = "{tz}"

[storage]
# Ledger and push subscriptions (env: HABIT_DATA_DIR)
# data_dir = "/home/me/.local/share/{APP_DIR}"
"#,
        timeout = sync::DEFAULT_TIMEOUT.as_secs(),
        debounce = form::DEFAULT_DEBOUNCE.as_millis(),
        tz = notify::DEFAULT_TIMEZONE,
    )
}
