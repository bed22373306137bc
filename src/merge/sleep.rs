//! Sleep window derivation from provider sleep segments.

use chrono::{NaiveDateTime, TimeDelta};

use crate::data::SleepSegment;
use crate::domain::{DailyRecord, DateKey, Metric, Observation};
use crate::error::MergeError;

const START_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Start and end of one sleep period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SleepWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl SleepWindow {
    pub fn hours(&self) -> f64 {
        (self.end - self.start).num_seconds() as f64 / 3600.0
    }
}

/// Pick the segment flagged as main sleep.
///
/// Naps and other secondary segments are never used as a fallback.
pub fn select_main_sleep(date: DateKey, segments: &[SleepSegment]) -> Result<&SleepSegment, MergeError> {
    segments
        .iter()
        .find(|s| s.is_main_sleep)
        .ok_or(MergeError::NoMainSleepSegment { date })
}

/// `end = start + duration` for a single segment.
pub fn derive_sleep_window(segment: &SleepSegment) -> Result<SleepWindow, MergeError> {
    let start = NaiveDateTime::parse_from_str(segment.start_time.trim(), START_TIME_FORMAT).map_err(|_| {
        MergeError::UnparsableMetricValue {
            metric: Metric::SleepStart,
            raw: segment.start_time.clone(),
        }
    })?;

    if segment.duration < 0 {
        return Err(MergeError::UnparsableMetricValue {
            metric: Metric::SleepEnd,
            raw: segment.duration.to_string(),
        });
    }
    let end = start
        .checked_add_signed(TimeDelta::milliseconds(segment.duration))
        .ok_or_else(|| MergeError::UnparsableMetricValue {
            metric: Metric::SleepEnd,
            raw: segment.duration.to_string(),
        })?;

    Ok(SleepWindow { start, end })
}

/// Sleep observation for the date a sleep query was issued for.
///
/// The observation is keyed by the segment's own `dateOfSleep`.
pub fn sleep_observation(queried: DateKey, segments: &[SleepSegment]) -> Result<Observation, MergeError> {
    let main = select_main_sleep(queried, segments)?;
    let window = derive_sleep_window(main)?;
    let date = DateKey::parse(&main.date_of_sleep)?;

    Ok(Observation {
        date,
        fields: DailyRecord {
            sleep_start: Some(window.start),
            sleep_end: Some(window.end),
            ..DailyRecord::default()
        },
    })
}
