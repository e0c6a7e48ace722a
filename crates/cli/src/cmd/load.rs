//! Show the saved values of one day

use crate::{system_config, util};
use anyhow::Result;
use habit_core::score::score_line;
use habit_core::{DateKey, FieldSet, FieldStore};
use owo_colors::OwoColorize;
use std::sync::Arc;
use sync::{FetchOutcome, RemoteSync};

pub async fn run(date: DateKey) -> Result<()> {
    let config = system_config::load()?;
    let client = util::open_client(&config)?;

    let pb = util::spinner(format!("Loading {}...", date.display_long()));
    let result = client.fetch(date).await;
    pb.finish_and_clear();

    match result {
        Ok(FetchOutcome::Found(snapshot)) => {
            let mut store = FieldStore::new(Arc::new(FieldSet::daily()));
            store.apply(&snapshot);
            util::print_day(store.field_set(), date, store.values());
            println!();
            println!("{}", score_line(store.score()).bold());
        }
        Ok(FetchOutcome::NotFound) => {
            println!("Nothing saved yet for {}.", date.display_long());
        }
        Err(err) => anyhow::bail!("Load failed: {} ({})", err.hint(), err),
    }

    Ok(())
}
