//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - initializes logging and loads the config store
//! - collects the merged dataset (providers or snapshot)
//! - prints reports / writes charts and exports

use std::fs::create_dir_all;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{ChartArgs, Command, CommonArgs, ExportArgs, FetchArgs};
use crate::config::Config;
use crate::domain::{ChartSeries, RunConfig};
use crate::error::AppError;
use crate::plot::ChartData;

pub mod pipeline;

/// Entry point for the `lifedb` binary.
pub fn run() -> Result<(), AppError> {
    // We want `lifedb` and `lifedb --days 14` to behave like `lifedb tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Chart(args) => handle_chart(args),
        Command::Summary(args) => handle_summary(args),
        Command::Export(args) => handle_export(args),
        Command::Sources(args) => handle_sources(args),
        Command::Tui(args) => handle_tui(args),
    }
}

fn handle_chart(args: ChartArgs) -> Result<(), AppError> {
    let config = init(&args.fetch.common)?;
    let run = run_config_from_args(&args.fetch);
    let out = pipeline::run_collect(&run, &config)?;

    create_dir_all(&args.out_dir).map_err(|e| {
        AppError::config(format!("Failed to create chart dir '{}': {e}", args.out_dir.display()))
    })?;

    let series = if args.series.is_empty() {
        ChartSeries::ALL.to_vec()
    } else {
        args.series.clone()
    };

    for s in series {
        let chart = ChartData::from_dataset(&out.dataset, s, run.default_value);
        let path = args.out_dir.join(format!("{}.svg", s.slug()));
        crate::plot::write_chart(&path, &chart)?;
        info!(series = s.slug(), path = %path.display(), "wrote chart");
        println!("{}", path.display());

        if args.ascii {
            println!(
                "{}",
                crate::plot::render_ascii_bars(&chart.title, &chart.labels, &chart.values, args.height)
            );
        }
    }

    Ok(())
}

fn handle_summary(args: FetchArgs) -> Result<(), AppError> {
    let config = init(&args.common)?;
    let run = run_config_from_args(&args);
    let out = pipeline::run_collect(&run, &config)?;

    println!("{}", crate::report::format_dataset_table(&out.dataset));
    if run.dataset.is_none() {
        println!("{}", crate::report::format_collect_report(&out.report));
    }

    let running = ChartData::from_dataset(&out.dataset, ChartSeries::Running, run.default_value);
    println!(
        "{}",
        crate::plot::render_ascii_bars(&running.title, &running.labels, &running.values, 8)
    );
    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    if args.json.is_none() && args.csv.is_none() {
        return Err(AppError::config("Nothing to export: pass --json and/or --csv."));
    }

    let config = init(&args.fetch.common)?;
    let run = run_config_from_args(&args.fetch);
    let out = pipeline::run_collect(&run, &config)?;

    if let Some(path) = &args.json {
        crate::io::dataset::write_dataset_json(path, &out.dataset)?;
        info!(path = %path.display(), "wrote dataset snapshot");
    }
    if let Some(path) = &args.csv {
        crate::io::export::write_series_csv(path, &out.dataset, run.default_value)?;
        info!(path = %path.display(), "wrote series CSV");
    }
    Ok(())
}

fn handle_sources(args: CommonArgs) -> Result<(), AppError> {
    let config = init(&args)?;
    println!("{}", crate::report::format_sources(&config));
    Ok(())
}

fn handle_tui(args: FetchArgs) -> Result<(), AppError> {
    // Log lines on stderr would tear through the alternate screen.
    init_tracing(args.common.verbose, true);
    let config = Config::load(args.common.config.as_deref())?;
    crate::tui::run(run_config_from_args(&args), config)
}

/// Logging first, then the config store; both happen once per process.
fn init(common: &CommonArgs) -> Result<Config, AppError> {
    init_tracing(common.verbose, false);
    Config::load(common.config.as_deref())
}

fn init_tracing(verbose: bool, interactive: bool) {
    let default = match (verbose, interactive) {
        (_, true) => "off",
        (true, false) => "lifedb=debug",
        (false, false) => "lifedb=warn",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run_config_from_args(args: &FetchArgs) -> RunConfig {
    RunConfig {
        days: args.days,
        end_date: args.end_date,
        dataset: args.dataset.clone(),
        skip: args.skip.clone(),
        running_label: args.running_label.clone(),
        strict_sleep: args.strict_sleep,
        default_value: args.default_value,
    }
}

/// Rewrite argv so `lifedb` defaults to `lifedb tui`.
///
/// Rules:
/// - `lifedb`                      -> `lifedb tui`
/// - `lifedb --days 14 ...`        -> `lifedb tui --days 14 ...`
/// - `lifedb --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "chart" | "summary" | "export" | "sources" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn bare_invocation_opens_the_dashboard() {
        assert_eq!(rewrite_args(argv(&["lifedb"])), argv(&["lifedb", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["lifedb", "--days", "14"])),
            argv(&["lifedb", "tui", "--days", "14"])
        );
        assert_eq!(rewrite_args(argv(&["lifedb", "--help"])), argv(&["lifedb", "--help"]));
        assert_eq!(rewrite_args(argv(&["lifedb", "summary"])), argv(&["lifedb", "summary"]));
    }

    #[test]
    fn fetch_flags_map_onto_run_config() {
        let cli = crate::cli::Cli::parse_from(argv(&[
            "lifedb",
            "chart",
            "--days",
            "14",
            "--end-date",
            "2017-01-22",
            "--skip",
            "gmail",
            "--default",
            "-1",
            "--strict-sleep",
            "-s",
            "running",
            "-s",
            "bedtime",
        ]));
        let Command::Chart(args) = cli.command else {
            panic!("expected chart command");
        };

        let run = run_config_from_args(&args.fetch);
        assert_eq!(run.days, 14);
        assert_eq!(run.end_date, chrono::NaiveDate::from_ymd_opt(2017, 1, 22));
        assert_eq!(run.skip, vec![crate::domain::Provider::Gmail]);
        assert!(run.uses(crate::domain::Provider::Fitbit));
        assert!(run.strict_sleep);
        assert_eq!(run.default_value, -1.0);
        assert_eq!(run.running_label, "Running");
        assert_eq!(args.series, vec![ChartSeries::Running, ChartSeries::Bedtime]);
    }
}
