//! Command-line parsing for lifedb.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the merge code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::{ChartSeries, Provider};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "lifedb", version, about = "Daily personal metrics, merged by date")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Collect the window and write one SVG chart per series.
    Chart(ChartArgs),
    /// Collect the window and print the merged table.
    Summary(FetchArgs),
    /// Collect the window and write a JSON snapshot and/or CSV.
    Export(ExportArgs),
    /// Report which provider credentials are configured.
    Sources(CommonArgs),
    /// Launch the interactive dashboard.
    Tui(FetchArgs),
}

/// Options shared by every command.
#[derive(Debug, Args, Clone)]
pub struct CommonArgs {
    /// Dotenv-style config file (defaults to `.env` in the working directory).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long)]
    pub verbose: bool,
}

/// Options controlling which window is collected and how.
#[derive(Debug, Args, Clone)]
pub struct FetchArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Number of days in the window.
    #[arg(short = 'n', long, default_value_t = 7)]
    pub days: usize,

    /// Last day of the window (YYYY-MM-DD, defaults to today).
    #[arg(long, value_name = "DATE")]
    pub end_date: Option<NaiveDate>,

    /// Load a saved dataset snapshot instead of querying providers.
    #[arg(long, value_name = "JSON")]
    pub dataset: Option<PathBuf>,

    /// Providers to leave out (repeatable).
    #[arg(long, value_enum)]
    pub skip: Vec<Provider>,

    /// Mail label whose messages carry running distances.
    #[arg(long, default_value = "Running")]
    pub running_label: String,

    /// Abort when a day has no main sleep segment instead of skipping it.
    #[arg(long)]
    pub strict_sleep: bool,

    /// Value used where a metric was not observed.
    #[arg(long = "default", default_value_t = 0.0, allow_negative_numbers = true)]
    pub default_value: f64,
}

/// Options for writing charts.
#[derive(Debug, Args, Clone)]
pub struct ChartArgs {
    #[command(flatten)]
    pub fetch: FetchArgs,

    /// Series to chart (repeatable; defaults to all).
    #[arg(short, long, value_enum)]
    pub series: Vec<ChartSeries>,

    /// Directory the SVG files are written to.
    #[arg(long, default_value = "charts")]
    pub out_dir: PathBuf,

    /// Also print each chart as ASCII bars.
    #[arg(long)]
    pub ascii: bool,

    /// ASCII plot height (rows).
    #[arg(long, default_value_t = 10)]
    pub height: usize,
}

/// Options for exports.
#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub fetch: FetchArgs,

    /// Write the merged dataset as a JSON snapshot.
    #[arg(long, value_name = "PATH")]
    pub json: Option<PathBuf>,

    /// Write every series as CSV.
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,
}
