//! Push subscription opt-in and opt-out

use crate::{system_config, util};
use anyhow::Result;
use journal::Subscription;
use owo_colors::OwoColorize;

pub async fn run_subscribe(endpoint: &str) -> Result<()> {
    let endpoint = endpoint.trim();
    if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
        anyhow::bail!("Invalid push endpoint {:?}: expected an http(s) URL", endpoint);
    }

    let config = system_config::load()?;
    let store = util::subscription_store(&config)?;

    if store.add(Subscription::new(endpoint))? {
        println!("{} Subscribed {}", "✓".green(), endpoint.cyan());
    } else {
        println!("Already subscribed: {}", endpoint.cyan());
    }
    Ok(())
}

pub async fn run_unsubscribe(endpoint: &str) -> Result<()> {
    let config = system_config::load()?;
    let store = util::subscription_store(&config)?;

    if store.remove(endpoint.trim())? {
        println!("{} Unsubscribed {}", "✓".green(), endpoint.trim().cyan());
    } else {
        println!("{}", format!("Not subscribed: {}", endpoint.trim()).yellow());
    }
    Ok(())
}

pub async fn run_list() -> Result<()> {
    let config = system_config::load()?;
    let store = util::subscription_store(&config)?;
    let list = store.list();

    if list.is_empty() {
        println!("Push notifications: {}", "off".yellow());
    } else {
        println!("Push notifications: {} ({} endpoints)", "on".green(), list.len());
        for sub in &list {
            let since = sub
                .created_at
                .map(|t| format!(" since {}", t.format("%Y-%m-%d")))
                .unwrap_or_default();
            println!("  {}{}", sub.endpoint.cyan(), since.dimmed());
        }
    }
    println!("{}: {}", "Store".dimmed(), store.path().display().dimmed());
    Ok(())
}
