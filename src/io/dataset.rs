//! Read/write dataset JSON files.
//!
//! A dataset snapshot is the "portable" representation of a merged window:
//! - the window bounds
//! - every daily record (absent metrics are omitted)
//!
//! Snapshots let charts be re-rendered without querying the providers again.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::{DailyRecord, DateKey, DateRange, Observation};
use crate::error::AppError;
use crate::merge::{Dataset, merge_provider_records};

/// On-disk schema of a dataset snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetFile {
    pub tool: String,
    #[serde(default)]
    pub generated: Option<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub records: BTreeMap<DateKey, DailyRecord>,
}

/// Write a dataset JSON file.
pub fn write_dataset_json(path: &Path, dataset: &Dataset) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::config(format!("Failed to create dataset JSON '{}': {e}", path.display())))?;

    let range = dataset.range();
    let snapshot = DatasetFile {
        tool: "lifedb".to_string(),
        generated: Some(Local::now().to_rfc3339()),
        start: range.start().date(),
        end: range.end().date(),
        records: dataset.iter().map(|(k, r)| (k, r.clone())).collect(),
    };

    serde_json::to_writer_pretty(file, &snapshot)
        .map_err(|e| AppError::config(format!("Failed to write dataset JSON: {e}")))?;

    Ok(())
}

/// Read a dataset JSON file.
///
/// Records are merged back through the normal merge path, so entries dated
/// outside the stored window are dropped.
pub fn read_dataset_json(path: &Path) -> Result<Dataset, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::config(format!("Failed to open dataset JSON '{}': {e}", path.display())))?;
    let snapshot: DatasetFile = serde_json::from_reader(file)
        .map_err(|e| AppError::config(format!("Invalid dataset JSON '{}': {e}", path.display())))?;

    let range = DateRange::between(snapshot.start, snapshot.end)?;
    let mut dataset = Dataset::new(range);
    merge_provider_records(
        &mut dataset,
        snapshot
            .records
            .into_iter()
            .map(|(date, fields)| Observation { date, fields }),
    );
    Ok(dataset)
}
