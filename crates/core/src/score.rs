//! Day score display

/// Render a backend score as a percentage
///
/// The backend reports either a fraction (`0.85`), a percentage number
/// (`85`) or an already formatted string (`"85%"`). Fractions in `(0, 1]`
/// are scaled; the result is rounded to one decimal place. Text that is not
/// numeric is passed through unchanged.
pub fn format_percent(raw: &str) -> String {
    let text = raw.trim();
    if text.ends_with('%') {
        return text.to_string();
    }

    let Ok(n) = text.parse::<f64>() else {
        return text.to_string();
    };
    if !n.is_finite() {
        return text.to_string();
    }

    let percent = if n > 0.0 && n <= 1.0 { n * 100.0 } else { n };
    let rounded = (percent * 10.0).round() / 10.0;
    format!("{}%", rounded)
}

/// Status line for the day score, `--` when there is none
pub fn score_line(score: Option<&str>) -> String {
    match score.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => format!("Score of the day: {}", format_percent(s)),
        None => "Score of the day: --".to_string(),
    }
}
