//! Time-of-day normalization for sleep timestamps.
//!
//! Bedtimes cluster around midnight, so raw seconds-since-midnight would wrap
//! from 86399 to 0 right where the data lives. Morning times are shifted past
//! the end of the day so "later" is always "larger".

use chrono::{NaiveDateTime, Timelike};

const NOON_SECS: u32 = 12 * 3600;
const DAY_SECS: u32 = 24 * 3600;

/// Seconds since midnight, with times before noon moved onto the next day.
///
/// `00:30` maps to `86400 + 1800`; `22:00` stays at `79200`.
pub fn normalize_time_of_day(timestamp: NaiveDateTime) -> u32 {
    let secs = timestamp.time().num_seconds_from_midnight();
    if secs < NOON_SECS { secs + DAY_SECS } else { secs }
}

/// Offsets from the series mean, in hours.
pub fn center_on_mean(series: &[f64]) -> Vec<f64> {
    if series.is_empty() {
        return Vec::new();
    }
    let mean = series.iter().sum::<f64>() / series.len() as f64;
    series.iter().map(|v| (v - mean) / 3600.0).collect()
}
