use crate::results::TestResult;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use std::error::Error;
use std::fmt::Write as _;
use time_humanize::{Accuracy, HumanTime, Tense};

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum HistoryFormat {
    Table,
    Csv,
    Json,
}

/// Render recent results (newest first) in the requested format
pub fn render(
    results: &[TestResult],
    format: HistoryFormat,
    now: DateTime<Utc>,
) -> Result<String, Box<dyn Error>> {
    match format {
        HistoryFormat::Table => Ok(render_table(results, now)),
        HistoryFormat::Csv => render_csv(results),
        HistoryFormat::Json => Ok(serde_json::to_string_pretty(results)?),
    }
}

fn display_time(ts: &DateTime<Utc>) -> String {
    ts.format("%b %d, %Y %H:%M").to_string()
}

fn relative_age(ts: &DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = (now - *ts).to_std().unwrap_or_default();
    if elapsed.as_secs() < 60 {
        return "just now".to_string();
    }
    HumanTime::from(elapsed).to_text_en(Accuracy::Rough, Tense::Past)
}

fn modifiers(result: &TestResult) -> String {
    let flags = [
        (result.flags.caps, "caps"),
        (result.flags.accents, "accents"),
        (result.flags.punctuation, "punct"),
        (result.flags.hard_mode, "hard"),
    ];
    let on: Vec<&str> = flags
        .iter()
        .filter(|(enabled, _)| *enabled)
        .map(|(_, name)| *name)
        .collect();
    if on.is_empty() {
        "-".to_string()
    } else {
        on.join(",")
    }
}

fn render_table(results: &[TestResult], now: DateTime<Utc>) -> String {
    if results.is_empty() {
        return "no results yet\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<19} {:<16} {:>5} {:>5} {:>5} {:>6} {:<4} {}",
        "date", "age", "wpm", "raw", "acc", "secs", "lang", "modifiers"
    );
    for r in results {
        let _ = writeln!(
            out,
            "{:<19} {:<16} {:>5} {:>5} {:>4}% {:>6} {:<4} {}",
            display_time(&r.created_at),
            relative_age(&r.created_at, now),
            r.wpm,
            r.raw_wpm,
            r.accuracy,
            r.duration_seconds,
            r.language.as_deref().unwrap_or("-"),
            modifiers(r),
        );
    }
    out
}

fn render_csv(results: &[TestResult]) -> Result<String, Box<dyn Error>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "created_at",
        "wpm",
        "raw_wpm",
        "accuracy",
        "duration_seconds",
        "chars",
        "correct_chars",
        "incorrect_chars",
        "extra_chars",
        "missed_chars",
        "language",
        "caps",
        "accents",
        "punctuation",
        "hard_mode",
    ])?;

    for r in results {
        writer.write_record([
            r.created_at.to_rfc3339(),
            r.wpm.to_string(),
            r.raw_wpm.to_string(),
            r.accuracy.to_string(),
            r.duration_seconds.to_string(),
            r.chars.total.to_string(),
            r.chars.correct.to_string(),
            r.chars.incorrect.to_string(),
            r.chars.extra.to_string(),
            r.chars.missed.to_string(),
            r.language.clone().unwrap_or_default(),
            r.flags.caps.to_string(),
            r.flags.accents.to_string(),
            r.flags.punctuation.to_string(),
            r.flags.hard_mode.to_string(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| e.to_string())?;
    Ok(String::from_utf8(bytes)?)
}
