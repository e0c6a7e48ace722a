//! Submissions recorded on this machine

use crate::{system_config, util};
use anyhow::Result;
use habit_core::{DateKey, DayRow, SaveKind};
use owo_colors::OwoColorize;

pub async fn run(limit: usize, date: Option<DateKey>, csv: bool) -> Result<()> {
    let config = system_config::load()?;
    let ledger = util::open_ledger(&config)?;

    let mut entries = match date {
        Some(date) => ledger.for_date(date)?,
        None => ledger.last_n(limit)?,
    };
    if entries.len() > limit {
        entries.drain(..entries.len() - limit);
    }

    if csv {
        println!("{}", DayRow::header().join(","));
        for entry in &entries {
            let cells: Vec<String> = entry.row.columns().iter().map(|c| csv_cell(c)).collect();
            println!("{}", cells.join(","));
        }
        return Ok(());
    }

    if entries.is_empty() {
        println!("{}", "No submissions recorded yet.".yellow());
        return Ok(());
    }

    println!("{}", "Submission History".bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for entry in &entries {
        let id = entry.id.to_string();
        let kind = match entry.kind {
            SaveKind::Habits => "habits",
            SaveKind::FullDay => "day",
        };
        let wellbeing = entry
            .row
            .wellbeing
            .map(|w| format!("  well-being {}", w))
            .unwrap_or_default();

        println!(
            "{}  {}  {:<6}  {}/10{}",
            (&id[..10]).yellow(),
            entry.row.date,
            kind,
            entry.row.habits_done(),
            wellbeing
        );
        println!(
            "            {}",
            entry
                .row
                .submitted_at
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
                .dimmed()
        );
        if !entry.row.notes.is_empty() {
            println!("            {}", entry.row.notes);
        }
    }
    println!();
    println!("{} of {} submissions", entries.len(), ledger.count());

    Ok(())
}

/// Quote a cell when it would break the row
fn csv_cell(cell: &str) -> String {
    if cell.contains([',', '"', '\n']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
