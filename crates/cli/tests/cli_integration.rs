//! End-to-end tests driving the `habit` binary
//!
//! No test talks to a real backend: the backend URL is always unset, so
//! every network path stops at the configuration check.

mod common;

use anyhow::Result;
use common::Sandbox;

#[test]
fn test_config_example_is_printed() -> Result<()> {
    let sandbox = Sandbox::new()?;
    let result = habit!(sandbox, "config", "--example").assert_success()?;
    assert!(result.contains_stdout("[backend]"));
    assert!(result.contains_stdout("debounce_ms = 450"));
    assert!(result.contains_stdout("America/Los_Angeles"));
    Ok(())
}

#[test]
fn test_config_set_then_get() -> Result<()> {
    let sandbox = Sandbox::new()?;
    habit!(sandbox, "config", "--set", "autosave.debounce_ms", "800").assert_success()?;
    assert!(sandbox.config_path().exists());

    let result = habit!(sandbox, "config", "--get", "autosave.debounce_ms").assert_success()?;
    assert_eq!(result.stdout.trim(), "800");
    Ok(())
}

#[test]
fn test_config_rejects_out_of_range_value() -> Result<()> {
    let sandbox = Sandbox::new()?;
    let result = habit!(sandbox, "config", "--set", "autosave.debounce_ms", "5").assert_failure()?;
    assert!(result.contains_stderr("50-10000"));
    assert!(!sandbox.config_path().exists());

    let result = habit!(sandbox, "config", "--set", "reminders.timezone", "Mars/Base").assert_failure()?;
    assert!(result.contains_stderr("unknown timezone"));
    Ok(())
}

#[test]
fn test_backend_url_env_override() -> Result<()> {
    let sandbox = Sandbox::new()?;
    let result = habit!(sandbox, "config", "--get", "backend.url")
        .env("HABIT_BACKEND_URL", "https://backend.example/exec")
        .assert_success()?;
    assert_eq!(result.stdout.trim(), "https://backend.example/exec");
    Ok(())
}

#[test]
fn test_empty_submit_is_rejected_locally() -> Result<()> {
    let sandbox = Sandbox::new()?;
    let result = habit!(sandbox, "submit").assert_failure()?;
    assert!(result.contains_stderr("Select or enter at least one field before saving."));
    Ok(())
}

#[test]
fn test_submit_rejects_unknown_field() -> Result<()> {
    let sandbox = Sandbox::new()?;
    let result = habit!(sandbox, "submit", "flossing=1").assert_failure()?;
    assert!(result.contains_stderr("unknown field: flossing"));

    let result = habit!(sandbox, "submit", "meditate=yes").assert_failure()?;
    assert!(result.contains_stderr("only accepts 0 or 1"));
    Ok(())
}

#[test]
fn test_submit_without_backend_reports_configuration() -> Result<()> {
    let sandbox = Sandbox::new()?;
    let result = habit!(sandbox, "submit", "meditate=1", "notes=calm").assert_failure()?;
    assert!(result.contains_stderr("Set backend.url first"));

    // Nothing was sent, so nothing was recorded.
    let history = habit!(sandbox, "history").assert_success()?;
    assert!(history.contains_stdout("No submissions recorded yet."));
    Ok(())
}

#[test]
fn test_load_without_backend_fails() -> Result<()> {
    let sandbox = Sandbox::new()?;
    let result = habit!(sandbox, "load", "2026-10-19").assert_failure()?;
    assert!(result.contains_stderr("Load failed"));
    Ok(())
}

#[test]
fn test_history_csv_header() -> Result<()> {
    let sandbox = Sandbox::new()?;
    let result = habit!(sandbox, "history", "--csv").assert_success()?;
    assert!(result.stdout.starts_with("timestamp,wakeUpAt8,"));
    Ok(())
}

#[test]
fn test_subscription_opt_in_and_out() -> Result<()> {
    let sandbox = Sandbox::new()?;
    let endpoint = "https://push.example/sub/1";

    let result = habit!(sandbox, "subscribe", endpoint).assert_success()?;
    assert!(result.contains_stdout("Subscribed"));
    let result = habit!(sandbox, "subscribe", endpoint).assert_success()?;
    assert!(result.contains_stdout("Already subscribed"));

    let result = habit!(sandbox, "subscriptions").assert_success()?;
    assert!(result.contains_stdout(endpoint));
    assert!(sandbox.data_dir().join("subscriptions.json").exists());

    let result = habit!(sandbox, "unsubscribe", endpoint).assert_success()?;
    assert!(result.contains_stdout("Unsubscribed"));
    let result = habit!(sandbox, "subscriptions").assert_success()?;
    assert!(result.contains_stdout("off"));
    Ok(())
}

#[test]
fn test_subscribe_rejects_non_url() -> Result<()> {
    let sandbox = Sandbox::new()?;
    let result = habit!(sandbox, "subscribe", "not-a-url").assert_failure()?;
    assert!(result.contains_stderr("Invalid push endpoint"));
    Ok(())
}

#[test]
fn test_forced_reminder_without_subscribers() -> Result<()> {
    let sandbox = Sandbox::new()?;
    let result = habit!(sandbox, "remind", "--force").assert_success()?;
    assert!(result.contains_stdout("No subscriptions; nothing sent."));
    Ok(())
}

#[test]
fn test_track_session_without_backend() -> Result<()> {
    let sandbox = Sandbox::new()?;
    let result = habit!(sandbox, "track", "--date", "2026-10-19")
        .stdin("meditate=1\nshow\nflossing=1\nquit\n")
        .assert_success()?;

    assert!(result.contains_stdout("Monday, October 19, 2026"));
    assert!(result.contains_stdout("Wake up at 8"));
    assert!(result.contains_stdout("unknown field: flossing"));
    assert!(result.contains_stdout("Set backend.url first"));
    assert!(sandbox.data_dir().join("logs").exists());
    Ok(())
}
