//! Habit completion and streaks

use crate::{system_config, util};
use anyhow::Result;
use owo_colors::OwoColorize;

pub async fn run() -> Result<()> {
    let config = system_config::load()?;
    let client = util::open_client(&config)?;

    let pb = util::spinner("Fetching insights...");
    let result = client.insights().await;
    pb.finish_and_clear();

    let insights = match result {
        Ok(Some(insights)) => insights,
        Ok(None) => {
            println!("{}", "No insights yet. Submit a few days first.".yellow());
            return Ok(());
        }
        Err(err) => anyhow::bail!("Insights failed: {} ({})", err.hint(), err),
    };

    println!("{}", "Habit Insights".bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("  {:<30} {:>10} {:>8}", "Habit".dimmed(), "Done".dimmed(), "Streak".dimmed());
    for habit in &insights.habits {
        println!(
            "  {:<30} {:>10} {:>8}",
            habit.label,
            habit.completion_display.cyan().to_string(),
            habit.current_streak
        );
    }
    println!();
    println!(
        "Average well-being: {} {}",
        insights.average_wellbeing.display.cyan(),
        format!("({} entries)", insights.average_wellbeing.count).dimmed()
    );

    Ok(())
}
