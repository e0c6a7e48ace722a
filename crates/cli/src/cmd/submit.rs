//! One-shot full-day submission

use crate::{system_config, util};
use anyhow::{Context, Result};
use habit_core::{parse_assignment, DateKey, FieldSet, FieldStore, SaveKind};
use owo_colors::OwoColorize;
use std::sync::Arc;
use sync::RemoteSync;

pub async fn run(date: DateKey, assignments: &[String]) -> Result<()> {
    let config = system_config::load()?;

    // 1. Validate locally; nothing goes out if this fails
    let mut store = FieldStore::new(Arc::new(FieldSet::daily()));
    for raw in assignments {
        let (name, value) = parse_assignment(raw)?;
        store.set(&name, &value)?;
    }
    let request = store.build_request(date, SaveKind::FullDay)?;

    // 2. Send
    let client = util::open_client(&config)?;
    let pb = util::spinner(format!("Submitting {}...", date.display_long()));
    let result = client.send(&request).await;
    pb.finish_and_clear();

    if let Err(err) = result {
        anyhow::bail!("Save failed: {} ({})", err.hint(), err);
    }

    // 3. Record locally
    let ledger = util::open_ledger(&config)?;
    let entry = ledger
        .record(&request)
        .context("Sent, but failed to record the submission locally")?;

    println!("{} Sent. Confirm in the sheet.", "✓".green());
    println!(
        "  {} fields for {} ({}/10 habits done)",
        request.payload.len(),
        date.display_long(),
        entry.row.habits_done()
    );

    Ok(())
}
