//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the merge code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use chrono::NaiveDateTime;

use crate::app::pipeline::CollectReport;
use crate::config::{self, Config};
use crate::data::{FitbitClient, GmailClient, PlaidClient, RescueTimeClient};
use crate::error::AppError;
use crate::merge::{Dataset, MergeStats};

/// One row per date with every metric; `-` marks a missing observation.
pub fn format_dataset_table(dataset: &Dataset) -> String {
    let mut out = String::new();
    let range = dataset.range();
    out.push_str(&format!(
        "=== lifedb: {} to {} ({} days) ===\n",
        range.start(),
        range.end(),
        range.num_days()
    ));

    out.push_str(
        format!(
            "{:<10} {:>8} {:>6} {:>16} {:>16} {:>8}\n",
            "date", "weight", "fat", "sleep start", "sleep end", "running"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<10} {:-<8} {:-<6} {:-<16} {:-<16} {:-<8}\n",
            "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for (date, record) in dataset.iter() {
        out.push_str(
            format!(
                "{:<10} {:>8} {:>6} {:>16} {:>16} {:>8}\n",
                date.to_string(),
                fmt_opt(record.weight, 1),
                fmt_opt(record.fat, 1),
                fmt_time(record.sleep_start),
                fmt_time(record.sleep_end),
                fmt_opt(record.running, 2),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Per-provider merge counts and skipped sleep dates.
pub fn format_collect_report(report: &CollectReport) -> String {
    let mut out = String::new();
    out.push_str("Providers:\n");
    out.push_str(&fmt_stats("weight", &report.weight));
    out.push_str(&fmt_stats("sleep", &report.sleep));
    out.push_str(&fmt_stats("running", &report.running));
    if !report.skipped_sleep.is_empty() {
        let dates: Vec<String> = report.skipped_sleep.iter().map(|d| d.to_string()).collect();
        out.push_str(&format!("  no main sleep: {}\n", dates.join(", ")));
    }
    out
}

/// One line per provider: `configured` with a masked identifier, or the reason it is not.
pub fn format_sources(config: &Config) -> String {
    let mut out = String::new();
    out.push_str("Sources:\n");
    out.push_str(&fmt_source(
        "Fitbit",
        FitbitClient::from_config(config).map(|_| {
            optional_keys(
                config,
                &[
                    config::FITBIT_CLIENT_ID,
                    config::FITBIT_CLIENT_SECRET,
                    config::FITBIT_REFRESH_TOKEN,
                ],
            )
        }),
    ));
    out.push_str(&fmt_source(
        "Gmail",
        GmailClient::from_config(config).map(|_| {
            let from = if config.get_opt(config::GOOGLE_ACCESS_TOKEN).is_some() {
                config::GOOGLE_ACCESS_TOKEN
            } else {
                config::GOOGLE_API_CLIENT_AUTH_FILEPATH
            };
            Some(format!("token from {from}"))
        }),
    ));
    out.push_str(&fmt_source(
        "Plaid",
        PlaidClient::from_config(config).map(|c| Some(mask(c.client_id()))),
    ));
    out.push_str(&fmt_source(
        "RescueTime",
        RescueTimeClient::from_config(config).map(|c| Some(mask(c.api_key()))),
    ));
    out
}

fn fmt_source(name: &str, status: Result<Option<String>, AppError>) -> String {
    match status {
        Ok(Some(hint)) => format!("  {name:<10} configured ({hint})\n"),
        Ok(None) => format!("  {name:<10} configured\n"),
        Err(e) => format!("  {name:<10} missing: {}\n", e.message()),
    }
}

/// Which of the optional `keys` are set, if any.
fn optional_keys(config: &Config, keys: &[&str]) -> Option<String> {
    let set: Vec<&str> = keys.iter().copied().filter(|k| config.get_opt(k).is_some()).collect();
    if set.is_empty() { None } else { Some(format!("also set: {}", set.join(", "))) }
}

/// Keep the last four characters of a credential.
fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("...{tail}")
}

fn fmt_stats(name: &str, stats: &MergeStats) -> String {
    format!(
        "  {name:<8} merged={} discarded={}\n",
        stats.merged, stats.discarded
    )
}

fn fmt_opt(v: Option<f64>, decimals: usize) -> String {
    match v {
        Some(v) if v.is_finite() => format!("{v:.decimals$}"),
        _ => "-".to_string(),
    }
}

fn fmt_time(t: Option<NaiveDateTime>) -> String {
    t.map(|t| t.format("%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}
