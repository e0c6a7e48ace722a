//! Reminder delivery
//!
//! A plain run sends whichever reminder matches the current local minute,
//! which suits an external scheduler calling it every minute. `--watch`
//! runs the schedule in-process instead.

use crate::{system_config, util};
use anyhow::Result;
use chrono::Utc;
use notify::{broadcast, due_at, next_after, HttpPushProvider, ReminderMessage, ReminderScheduler};
use owo_colors::OwoColorize;
use std::sync::Arc;

pub async fn run(force: bool, watch: bool) -> Result<()> {
    let config = system_config::load()?;
    let timezone = config.timezone()?;
    let store = util::subscription_store(&config)?;
    let provider = Arc::new(HttpPushProvider::new(config.timeout())?);

    if watch {
        println!(
            "Watching for reminders in {} {}",
            timezone.name().cyan(),
            "(Ctrl-C to stop)".dimmed()
        );
        let scheduler = ReminderScheduler::new(store, provider, timezone);
        return tokio::select! {
            result = scheduler.run() => result,
            _ = tokio::signal::ctrl_c() => Ok(()),
        };
    }

    let now = Utc::now().with_timezone(&timezone);
    let message = if force {
        ReminderMessage::test()
    } else {
        match due_at(&now) {
            Some(reminder) => reminder.message(),
            None => {
                println!(
                    "No reminder scheduled for this run: {}",
                    now.format("%Y-%m-%dT%H:%M:%S")
                );
                if let Some((at, reminder)) = next_after(now) {
                    println!(
                        "  {} {} at {}",
                        "Next:".dimmed(),
                        reminder.title,
                        at.format("%Y-%m-%d %H:%M %Z")
                    );
                }
                return Ok(());
            }
        }
    };

    if store.list().is_empty() {
        println!("{}", "No subscriptions; nothing sent.".yellow());
        return Ok(());
    }

    let pb = util::spinner(format!("Sending \"{}\"...", message.title));
    let report = broadcast(&store, provider.as_ref(), &message).await?;
    pb.finish_and_clear();

    println!(
        "{} Sent \"{}\" to {}/{} subscribers",
        "✓".green(),
        message.title,
        report.delivered,
        report.attempted
    );
    if report.failed > 0 {
        println!("  {} deliveries failed", report.failed.to_string().red());
    }
    if report.pruned > 0 {
        println!("  {} dead subscriptions removed", report.pruned.to_string().yellow());
    }

    Ok(())
}
