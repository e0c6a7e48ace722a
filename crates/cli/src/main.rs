//! Habit tracker CLI - habit command

use anyhow::Result;
use clap::{Parser, Subcommand};
use habit_core::DateKey;

mod cmd;
mod logging;
mod system_config;
mod util;

/// Habit tracker - daily check-ins backed by a spreadsheet
#[derive(Parser)]
#[command(name = "habit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log filter (trace, debug, info, warn, error); defaults to RUST_LOG or warn
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive session: edit habits with autosave, navigate days
    Track {
        /// Day to open (YYYY-MM-DD, today, yesterday)
        #[arg(long, default_value = "today")]
        date: DateKey,
    },
    /// Submit a full day in one shot
    Submit {
        /// Day the values belong to
        #[arg(long, default_value = "today")]
        date: DateKey,
        /// Field values as name=value (e.g. meditate=1 notes="slept well")
        values: Vec<String>,
    },
    /// Show the saved values of a day
    Load {
        /// Day to load
        #[arg(default_value = "today")]
        date: DateKey,
    },
    /// Habit completion, streaks and average well-being
    Insights,
    /// Submissions recorded on this machine
    History {
        /// Number of entries to show
        #[arg(long, default_value = "10")]
        limit: usize,
        /// Only entries for this day
        #[arg(long)]
        date: Option<DateKey>,
        /// Print sheet rows as CSV
        #[arg(long)]
        csv: bool,
    },
    /// Send the reminder due right now to every subscriber
    Remind {
        /// Send an instant test notification regardless of time
        #[arg(long)]
        force: bool,
        /// Keep running and send each reminder when it is due
        #[arg(long, conflicts_with = "force")]
        watch: bool,
    },
    /// Opt a push endpoint in to reminders
    Subscribe {
        /// Push endpoint URL
        endpoint: String,
    },
    /// Opt a push endpoint out of reminders
    Unsubscribe {
        /// Push endpoint URL
        endpoint: String,
    },
    /// Show stored push subscriptions
    Subscriptions,
    /// View or edit configuration
    Config {
        /// List all values
        #[arg(long)]
        list: bool,
        /// Print one value
        #[arg(long, value_name = "KEY")]
        get: Option<String>,
        /// Set one value
        #[arg(long, num_args = 2, value_names = ["KEY", "VALUE"])]
        set: Option<Vec<String>>,
        /// Print the config file path
        #[arg(long)]
        path: bool,
        /// With --path: create the file with defaults if missing
        #[arg(long, requires = "path")]
        create: bool,
        /// Print an annotated example config
        #[arg(long)]
        example: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = cli.log_level.as_deref();

    // The interactive session sets up file logging itself.
    if !matches!(cli.command, Commands::Track { .. }) {
        logging::init_stderr(log_level);
    }

    match cli.command {
        Commands::Track { date } => cmd::track::run(date, log_level).await,
        Commands::Submit { date, values } => cmd::submit::run(date, &values).await,
        Commands::Load { date } => cmd::load::run(date).await,
        Commands::Insights => cmd::insights::run().await,
        Commands::History { limit, date, csv } => cmd::history::run(limit, date, csv).await,
        Commands::Remind { force, watch } => cmd::remind::run(force, watch).await,
        Commands::Subscribe { endpoint } => cmd::subscriptions::run_subscribe(&endpoint).await,
        Commands::Unsubscribe { endpoint } => cmd::subscriptions::run_unsubscribe(&endpoint).await,
        Commands::Subscriptions => cmd::subscriptions::run_list().await,
        Commands::Config { list: _, get, set, path, create, example } => {
            if let Some(key) = get {
                cmd::config::run_get(&key).await
            } else if let Some([key, value]) = set.as_deref() {
                cmd::config::run_set(key, value).await
            } else if path {
                cmd::config::run_path(create).await
            } else if example {
                cmd::config::run_example().await
            } else {
                cmd::config::run_list().await
            }
        }
    }
}
