//! Interactive tracking session
//!
//! Reads one command per line from stdin. Habit edits autosave after the
//! configured quiet period; every save the backend accepts is appended to
//! the local ledger.

use crate::{logging, system_config, util};
use anyhow::Result;
use form::{FormSession, LoadOutcome, SaveOutcome};
use habit_core::score::score_line;
use habit_core::{parse_assignment, DateKey, SaveReason, SaveRequest};
use journal::Ledger;
use owo_colors::OwoColorize;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Show,
    Set(String, String),
    Save,
    Submit,
    Move(i64),
    Goto(DateKey),
    Reload,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Command::Show);
    }
    if line.contains('=') && !line.contains(' ') {
        let (name, value) = parse_assignment(line).map_err(|e| e.to_string())?;
        return Ok(Command::Set(name, value));
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match (word, rest) {
        ("show" | "s", "") => Ok(Command::Show),
        ("set", rest) => match rest.split_once(char::is_whitespace) {
            Some((name, value)) => Ok(Command::Set(name.to_string(), value.trim().to_string())),
            None if !rest.is_empty() => Ok(Command::Set(rest.to_string(), String::new())),
            None => Err("usage: set <field> <value>".to_string()),
        },
        ("done" | "y", name) if !name.is_empty() => Ok(Command::Set(name.to_string(), "1".to_string())),
        ("skip" | "n", name) if !name.is_empty() => Ok(Command::Set(name.to_string(), "0".to_string())),
        ("unset", name) if !name.is_empty() => Ok(Command::Set(name.to_string(), String::new())),
        ("save", "") => Ok(Command::Save),
        ("submit", "") => Ok(Command::Submit),
        ("next", "") => Ok(Command::Move(1)),
        ("prev", "") => Ok(Command::Move(-1)),
        ("today", "") => Ok(Command::Goto(DateKey::today())),
        ("goto" | "g", date) if !date.is_empty() => {
            date.parse().map(Command::Goto).map_err(|e: habit_core::FieldError| e.to_string())
        }
        ("reload", "") => Ok(Command::Reload),
        ("help" | "?", "") => Ok(Command::Help),
        ("quit" | "exit" | "q", "") => Ok(Command::Quit),
        _ => Err(format!("unknown command: {} (try 'help')", line)),
    }
}

fn print_help() {
    println!("{}", "Commands".bold());
    println!("  {:<24} {}", "show".cyan(), "print the form (also: empty line)");
    println!("  {:<24} {}", "<field>=<value>".cyan(), "set a field, e.g. meditate=1");
    println!("  {:<24} {}", "set <field> <value>".cyan(), "set a field; values may contain spaces");
    println!("  {:<24} {}", "done|skip <habit>".cyan(), "mark a habit 1 or 0");
    println!("  {:<24} {}", "unset <field>".cyan(), "clear a field");
    println!("  {:<24} {}", "save".cyan(), "save habits now");
    println!("  {:<24} {}", "submit".cyan(), "submit the whole day");
    println!("  {:<24} {}", "next|prev|today".cyan(), "move to another day");
    println!("  {:<24} {}", "goto <YYYY-MM-DD>".cyan(), "jump to a day");
    println!("  {:<24} {}", "reload".cyan(), "load the current day again");
    println!("  {:<24} {}", "quit".cyan(), "save pending edits and exit");
}

fn show(session: &FormSession) {
    util::print_day(&session.field_set(), session.date(), &session.values());
    println!("{}", score_line(session.score().as_deref()).dimmed());
}

fn prompt(session: &FormSession) {
    print!("{} ", format!("[{}]>", session.date()).bold());
    let _ = std::io::stdout().flush();
}

fn spawn_status_printer(mut status: watch::Receiver<form::Status>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while status.changed().await.is_ok() {
            let current = status.borrow_and_update().clone();
            util::print_status(&current);
        }
    })
}

fn spawn_recorder(mut saved: broadcast::Receiver<SaveRequest>, ledger: Arc<Ledger>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match saved.recv().await {
                Ok(request) => match ledger.record(&request) {
                    Ok(entry) => info!("Recorded {} for {}", entry.id, request.date),
                    Err(e) => warn!("Failed to record save for {}: {:#}", request.date, e),
                },
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!("Ledger recorder missed {} saves", missed);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

/// Wait until no save is outstanding, at most `limit`
async fn wait_idle(session: &FormSession, limit: Duration) {
    let deadline = tokio::time::Instant::now() + limit;
    while session.is_saving() && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

pub async fn run(date: DateKey, log_level: Option<&str>) -> Result<()> {
    let config = system_config::load()?;
    let data_dir = config.data_dir()?;
    let _log_guard = logging::init_file(log_level, &data_dir.join("logs"))?;

    let client = util::open_client(&config)?;
    let configured = client.is_configured();
    let ledger = Arc::new(util::open_ledger(&config)?);
    let session = util::open_session(&config, client, date);

    let printer = spawn_status_printer(session.status());
    let recorder = spawn_recorder(session.subscribe_saved(), ledger);

    info!("Tracking session started for {}", date);
    println!("{}", "Habit Tracker".bold());
    println!("{}", "Type 'help' for commands.".dimmed());
    if configured {
        session.load_for_date(date).await;
    } else {
        println!("{} {}", "!".yellow(), sync::SyncError::NotConfigured.hint().yellow());
    }
    show(&session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt(&session);
        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{} {}", "!".yellow(), message);
                continue;
            }
        };

        match command {
            Command::Show => show(&session),
            Command::Set(name, value) => {
                if let Err(e) = session.set_field(&name, &value) {
                    println!("{} {}", "✗".red(), e);
                }
            }
            Command::Save => {
                if let SaveOutcome::Queued = session.trigger_save(SaveReason::Button).await {
                    println!("{}", "Save queued behind the one in flight.".dimmed());
                }
            }
            Command::Submit => {
                session.trigger_save(SaveReason::Submit).await;
            }
            Command::Move(days) => {
                if !matches!(session.navigate(days).await, LoadOutcome::Stale) {
                    show(&session);
                }
            }
            Command::Goto(target) => {
                if !matches!(session.go_to(target).await, LoadOutcome::Stale) {
                    show(&session);
                }
            }
            Command::Reload => {
                session.reload().await;
                show(&session);
            }
            Command::Help => print_help(),
            Command::Quit => break,
        }
    }

    // Unsaved habit edits go out before exit.
    if session.has_unsaved_edits() {
        session.trigger_save(SaveReason::Button).await;
    }
    wait_idle(&session, config.timeout() + config.debounce()).await;

    // Let the printer show the final status, then drain the recorder.
    tokio::time::sleep(Duration::from_millis(50)).await;
    printer.abort();
    drop(session);
    let _ = tokio::time::timeout(config.debounce() + Duration::from_millis(250), recorder).await;

    info!("Tracking session ended");
    Ok(())
}
