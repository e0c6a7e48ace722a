//! Shared utilities for CLI commands

use crate::system_config::SystemConfig;
use anyhow::{Context, Result};
use form::{FormSession, SessionOptions, Status, Tone, TokioTimer};
use habit_core::{DateKey, FieldKind, FieldSet};
use indicatif::{ProgressBar, ProgressStyle};
use journal::{Ledger, SubscriptionStore};
use owo_colors::OwoColorize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use sync::HttpSyncClient;

/// HTTP client for the configured backend
pub fn open_client(config: &SystemConfig) -> Result<Arc<HttpSyncClient>> {
    let client = HttpSyncClient::new(config.backend.url.clone(), config.timeout())
        .context("Failed to build HTTP client")?;
    Ok(Arc::new(client))
}

/// Form session for `date` against the configured backend
pub fn open_session(config: &SystemConfig, client: Arc<HttpSyncClient>, date: DateKey) -> FormSession {
    let options = SessionOptions {
        fields: Arc::new(FieldSet::daily()),
        date,
        debounce: config.debounce(),
    };
    FormSession::new(options, client, Arc::new(TokioTimer))
}

/// Local submission ledger
pub fn open_ledger(config: &SystemConfig) -> Result<Ledger> {
    let dir = config.data_dir()?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create data directory {}", dir.display()))?;
    Ledger::open(&dir).context("Failed to open submission ledger")
}

/// Push subscription store, creating its file if missing
pub fn subscription_store(config: &SystemConfig) -> Result<SubscriptionStore> {
    let store = SubscriptionStore::new(&config.data_dir()?);
    store.ensure_file()?;
    Ok(store)
}

/// Spinner on stderr; hidden automatically when stderr is not a terminal
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Print a status line with its tone
pub fn print_status(status: &Status) {
    if status.text.is_empty() {
        return;
    }
    match status.tone {
        Tone::Progress => println!("{}", status.text.dimmed()),
        Tone::Done => println!("{} {}", "✓".green(), status.text),
        Tone::Warning => println!("{} {}", "!".yellow(), status.text.yellow()),
        Tone::Error => println!("{} {}", "✗".red(), status.text.red()),
    }
}

/// Print the form for one day: every habit, then the set extra fields
pub fn print_day(fields: &FieldSet, date: DateKey, values: &BTreeMap<String, String>) {
    println!("{}", date.display_long().bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    for spec in fields.iter() {
        let value = values.get(&spec.name).map(String::as_str).unwrap_or("");
        match spec.kind {
            FieldKind::Binary => {
                let mark = match value {
                    "1" => "✓".green().to_string(),
                    "0" => "✗".red().to_string(),
                    _ => "·".dimmed().to_string(),
                };
                println!("  {} {:<34} {}", mark, spec.label, spec.name.dimmed());
            }
            FieldKind::Number | FieldKind::Text => {
                if !value.is_empty() {
                    println!("  {:<36} {}", format!("{}:", spec.label), value.cyan());
                }
            }
        }
    }
}
