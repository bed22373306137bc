//! Export per-date series to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::ChartSeries;
use crate::error::AppError;
use crate::merge::{Dataset, chart_values, date_labels};

/// Write one row per date with a column for every chartable series.
pub fn write_series_csv(path: &Path, dataset: &Dataset, default: f64) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::config(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_series(&mut file, dataset, default)
        .map_err(|e| AppError::config(format!("Failed to write export CSV '{}': {e}", path.display())))
}

fn write_series<W: Write>(out: &mut W, dataset: &Dataset, default: f64) -> std::io::Result<()> {
    let columns: Vec<Vec<f64>> = ChartSeries::ALL
        .iter()
        .map(|&s| chart_values(dataset, s, default))
        .collect();

    // Header
    let names: Vec<&str> = ChartSeries::ALL.iter().map(|s| s.slug()).collect();
    writeln!(out, "date,{}", names.join(","))?;

    for (row, date) in date_labels(dataset.range()).iter().enumerate() {
        let cells: Vec<String> = columns.iter().map(|c| format!("{:.4}", c[row])).collect();
        writeln!(out, "{date},{}", cells.join(","))?;
    }

    Ok(())
}
