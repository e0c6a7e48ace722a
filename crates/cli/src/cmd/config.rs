//! Configuration management command
//!
//! Provides CLI interface to view and edit the config file.

use crate::system_config::{self, SystemConfig};
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::path::PathBuf;

/// Keys accepted by --get and --set
const KEYS: [&str; 5] = [
    "backend.url",
    "backend.timeout_secs",
    "autosave.debounce_ms",
    "reminders.timezone",
    "storage.data_dir",
];

/// List all configuration values
pub async fn run_list() -> Result<()> {
    let config = system_config::load()?;
    let config_path = system_config::config_file_path()
        .context("Could not determine config file path")?;

    println!("{}", "Configuration".bold());
    println!("{}: {}\n", "Location".dimmed(), config_path.display().dimmed());

    println!("{}", "[backend]".yellow());
    let url_note = if sync::is_configured_url(&config.backend.url) {
        String::new()
    } else {
        "(not configured)".red().to_string()
    };
    println!("  {} = {:?} {}", "url".cyan(), config.backend.url, url_note);
    println!(
        "  {} = {} {}",
        "timeout_secs".cyan(),
        config.backend.timeout_secs,
        format!("({}s)", config.backend.timeout_secs).dimmed()
    );

    println!("\n{}", "[autosave]".yellow());
    println!(
        "  {} = {} {}",
        "debounce_ms".cyan(),
        config.autosave.debounce_ms,
        format!("({}ms after the last habit edit)", config.autosave.debounce_ms).dimmed()
    );

    println!("\n{}", "[reminders]".yellow());
    println!("  {} = {:?}", "timezone".cyan(), config.reminders.timezone);

    println!("\n{}", "[storage]".yellow());
    println!("  {} = {}", "data_dir".cyan(), config.data_dir()?.display());

    println!("\n{}", "Valid Ranges:".bold());
    println!("  timeout_secs: 1-60");
    println!("  debounce_ms: 50-10,000");
    println!("  timezone: IANA name (e.g. America/Los_Angeles)");

    Ok(())
}

/// Get a single configuration value
pub async fn run_get(key: &str) -> Result<()> {
    let config = system_config::load()?;
    println!("{}", get_value(&config, key)?);
    Ok(())
}

/// Set a configuration value
pub async fn run_set(key: &str, value: &str) -> Result<()> {
    // Environment overrides must not leak into the file.
    let mut config = system_config::load_file()?;
    set_value(&mut config, key, value)?;

    // Validate before saving
    config.validate().context("Invalid configuration value")?;

    system_config::save(&config)?;

    println!("{} {} = {}", "✓".green(), key.cyan(), value);
    Ok(())
}

/// Show the config file path and optionally create it
pub async fn run_path(create: bool) -> Result<()> {
    let config_path = system_config::config_file_path()
        .context("Could not determine config file path")?;

    if create && !config_path.exists() {
        system_config::init_if_missing()?;
        println!("{} Created config file at: {}", "✓".green(), config_path.display());
    } else if config_path.exists() {
        println!("{}", config_path.display());
    } else {
        println!("{}", config_path.display());
        println!("{}", "File does not exist. Use --create to create it.".yellow());
    }

    Ok(())
}

/// Show example configuration
pub async fn run_example() -> Result<()> {
    println!("{}", system_config::example_config());
    Ok(())
}

fn unknown_key(key: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "Unknown config key: {}. Known keys: {}",
        key,
        KEYS.join(", ")
    )
}

fn get_value(config: &SystemConfig, key: &str) -> Result<String> {
    let value = match key {
        "backend.url" => config.backend.url.clone(),
        "backend.timeout_secs" => config.backend.timeout_secs.to_string(),
        "autosave.debounce_ms" => config.autosave.debounce_ms.to_string(),
        "reminders.timezone" => config.reminders.timezone.clone(),
        "storage.data_dir" => config.data_dir()?.display().to_string(),
        _ => return Err(unknown_key(key)),
    };
    Ok(value)
}

fn set_value(config: &mut SystemConfig, key: &str, value: &str) -> Result<()> {
    match key {
        "backend.url" => {
            config.backend.url = value.trim().to_string();
        }
        "backend.timeout_secs" => {
            config.backend.timeout_secs = value
                .parse()
                .context("Invalid value: must be a positive integer")?;
        }
        "autosave.debounce_ms" => {
            config.autosave.debounce_ms = value
                .parse()
                .context("Invalid value: must be a positive integer")?;
        }
        "reminders.timezone" => {
            config.reminders.timezone = value.trim().to_string();
        }
        "storage.data_dir" => {
            let value = value.trim();
            config.storage.data_dir = if value.is_empty() {
                None
            } else {
                Some(PathBuf::from(value))
            };
        }
        _ => return Err(unknown_key(key)),
    }
    Ok(())
}
