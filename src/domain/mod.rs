//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - date keys and windows (`DateKey`, `DateRange`)
//! - per-day metric records (`Metric`, `DailyRecord`, `Observation`)
//! - chartable series and run configuration (`ChartSeries`, `RunConfig`)

pub mod types;

pub use types::*;
