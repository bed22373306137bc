//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - merged in-memory as provider data arrives
//! - exported to JSON/CSV
//! - reloaded later for charting without touching the providers

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{Days, NaiveDate, NaiveDateTime};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, MergeError};

/// A calendar date identifying one daily record.
///
/// The canonical string form is `YYYY-MM-DD`; ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub const FORMAT: &'static str = "%Y-%m-%d";

    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(self) -> NaiveDate {
        self.0
    }

    /// Parse the canonical `YYYY-MM-DD` form.
    pub fn parse(raw: &str) -> Result<Self, MergeError> {
        NaiveDate::parse_from_str(raw.trim(), Self::FORMAT)
            .map(Self)
            .map_err(|_| MergeError::InvalidDate { raw: raw.to_string() })
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

impl FromStr for DateKey {
    type Err = MergeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl TryFrom<String> for DateKey {
    type Error = MergeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DateKey> for String {
    fn from(key: DateKey) -> Self {
        key.to_string()
    }
}

/// Metrics a `DailyRecord` can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    /// Body weight in pounds.
    Weight,
    /// Body fat percentage.
    Fat,
    SleepStart,
    SleepEnd,
    /// Running distance (miles, as reported in the mail subject).
    Running,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Weight,
        Metric::Fat,
        Metric::SleepStart,
        Metric::SleepEnd,
        Metric::Running,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Metric::Weight => "weight",
            Metric::Fat => "fat",
            Metric::SleepStart => "sleepStart",
            Metric::SleepEnd => "sleepEnd",
            Metric::Running => "running",
        }
    }

    pub fn is_timestamp(self) -> bool {
        matches!(self, Metric::SleepStart | Metric::SleepEnd)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Named metric values for one date.
///
/// `None` means "no observation for that date", which is different from zero.
/// Defaults are only substituted when a series is extracted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_start: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_end: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub running: Option<f64>,
}

impl DailyRecord {
    pub fn is_empty(&self) -> bool {
        Metric::ALL.iter().all(|&m| !self.has(m))
    }

    pub fn has(&self, metric: Metric) -> bool {
        match metric {
            Metric::Weight => self.weight.is_some(),
            Metric::Fat => self.fat.is_some(),
            Metric::SleepStart => self.sleep_start.is_some(),
            Metric::SleepEnd => self.sleep_end.is_some(),
            Metric::Running => self.running.is_some(),
        }
    }

    /// Numeric value of a float metric. Timestamp metrics yield `None`.
    pub fn number(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Weight => self.weight,
            Metric::Fat => self.fat,
            Metric::Running => self.running,
            Metric::SleepStart | Metric::SleepEnd => None,
        }
    }

    /// Value of a timestamp metric. Float metrics yield `None`.
    pub fn timestamp(&self, metric: Metric) -> Option<NaiveDateTime> {
        match metric {
            Metric::SleepStart => self.sleep_start,
            Metric::SleepEnd => self.sleep_end,
            Metric::Weight | Metric::Fat | Metric::Running => None,
        }
    }

    /// Field-level merge: every field present in `other` overwrites ours.
    pub fn absorb(&mut self, other: DailyRecord) {
        self.weight = other.weight.or(self.weight);
        self.fat = other.fat.or(self.fat);
        self.sleep_start = other.sleep_start.or(self.sleep_start);
        self.sleep_end = other.sleep_end.or(self.sleep_end);
        self.running = other.running.or(self.running);
    }
}

/// One provider-supplied partial record, already keyed by `DateKey`.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub date: DateKey,
    pub fields: DailyRecord,
}

/// `N` consecutive dates ending at `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// The `days`-long window ending on (and including) `end`.
    pub fn ending_on(end: NaiveDate, days: usize) -> Result<Self, AppError> {
        if days == 0 {
            return Err(AppError::config("Date range must span at least one day."));
        }
        let start = end
            .checked_sub_days(Days::new(days as u64 - 1))
            .ok_or_else(|| AppError::config(format!("Date range of {days} days ending {end} is out of bounds.")))?;
        Ok(Self { start, end })
    }

    /// Inclusive range between two dates.
    pub fn between(start: NaiveDate, end: NaiveDate) -> Result<Self, AppError> {
        if start > end {
            return Err(AppError::config(format!(
                "Date range start {start} is after its end {end}."
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateKey {
        DateKey(self.start)
    }

    pub fn end(&self) -> DateKey {
        DateKey(self.end)
    }

    /// The boundary date one day before the window, used for labeling only.
    pub fn first(&self) -> DateKey {
        DateKey(self.start.pred_opt().unwrap_or(self.start))
    }

    pub fn num_days(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    pub fn contains(&self, key: DateKey) -> bool {
        key.0 >= self.start && key.0 <= self.end
    }

    /// Dates in the window, oldest first.
    pub fn keys(&self) -> impl Iterator<Item = DateKey> + '_ {
        self.start.iter_days().take(self.num_days()).map(DateKey)
    }
}

/// How a series is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Line,
}

/// Series that can be charted from a merged dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum ChartSeries {
    Weight,
    Fat,
    Running,
    /// Hours between sleep start and sleep end.
    SleepHours,
    /// Sleep start relative to the window's average, in hours.
    Bedtime,
    /// Sleep end relative to the window's average, in hours.
    Waketime,
}

impl ChartSeries {
    pub const ALL: [ChartSeries; 6] = [
        ChartSeries::Weight,
        ChartSeries::Fat,
        ChartSeries::Running,
        ChartSeries::SleepHours,
        ChartSeries::Bedtime,
        ChartSeries::Waketime,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ChartSeries::Weight => "Weight",
            ChartSeries::Fat => "Body Fat",
            ChartSeries::Running => "Running",
            ChartSeries::SleepHours => "Sleep",
            ChartSeries::Bedtime => "Bedtime",
            ChartSeries::Waketime => "Wake Time",
        }
    }

    pub fn y_label(self) -> &'static str {
        match self {
            ChartSeries::Weight => "Pounds",
            ChartSeries::Fat => "Body fat (%)",
            ChartSeries::Running => "Miles in 30 minutes",
            ChartSeries::SleepHours => "Hours asleep",
            ChartSeries::Bedtime => "Hours from average bedtime",
            ChartSeries::Waketime => "Hours from average wake time",
        }
    }

    /// File-name friendly identifier (matches the CLI value).
    pub fn slug(self) -> &'static str {
        match self {
            ChartSeries::Weight => "weight",
            ChartSeries::Fat => "fat",
            ChartSeries::Running => "running",
            ChartSeries::SleepHours => "sleep-hours",
            ChartSeries::Bedtime => "bedtime",
            ChartSeries::Waketime => "waketime",
        }
    }

    pub fn kind(self) -> ChartKind {
        match self {
            ChartSeries::Weight | ChartSeries::Fat => ChartKind::Line,
            ChartSeries::Running | ChartSeries::SleepHours | ChartSeries::Bedtime | ChartSeries::Waketime => {
                ChartKind::Bar
            }
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|&s| s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|&s| s == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Chart title for a window, e.g. `Running (Week of 2017-01-15)`.
    pub fn chart_title(self, range: &DateRange) -> String {
        if range.num_days() == 7 {
            format!("{} (Week of {})", self.title(), range.first())
        } else {
            format!("{} (since {})", self.title(), range.first())
        }
    }
}

/// Providers that feed the merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Provider {
    Fitbit,
    Gmail,
}

impl Provider {
    pub fn display_name(self) -> &'static str {
        match self {
            Provider::Fitbit => "Fitbit",
            Provider::Gmail => "Gmail",
        }
    }
}

/// A run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Window length in days.
    pub days: usize,
    /// Last date of the window; `None` means today (local time).
    pub end_date: Option<NaiveDate>,
    /// Load a saved dataset instead of querying providers.
    pub dataset: Option<PathBuf>,
    pub skip: Vec<Provider>,
    /// Mail label holding the running reports.
    pub running_label: String,
    /// Abort instead of skipping dates without a main sleep segment.
    pub strict_sleep: bool,
    /// Value substituted for missing observations in extracted series.
    pub default_value: f64,
}

impl RunConfig {
    pub fn uses(&self, provider: Provider) -> bool {
        !self.skip.contains(&provider)
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            days: 7,
            end_date: None,
            dataset: None,
            skip: Vec::new(),
            running_label: "Running".to_string(),
            strict_sleep: false,
            default_value: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn date_key_uses_canonical_form() {
        let key = DateKey::parse("2017-01-16").unwrap();
        assert_eq!(key.date(), date(2017, 1, 16));
        assert_eq!(key.to_string(), "2017-01-16");
        assert!(matches!(
            DateKey::parse("16/01/2017"),
            Err(MergeError::InvalidDate { .. })
        ));
    }

    #[test]
    fn week_range_ends_today_with_boundary_before_window() {
        let range = DateRange::ending_on(date(2017, 1, 22), 7).unwrap();
        assert_eq!(range.num_days(), 7);
        assert_eq!(range.start().to_string(), "2017-01-16");
        assert_eq!(range.end().to_string(), "2017-01-22");
        assert_eq!(range.first().to_string(), "2017-01-15");

        let keys: Vec<String> = range.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys.first().map(String::as_str), Some("2017-01-16"));
        assert_eq!(keys.last().map(String::as_str), Some("2017-01-22"));
        assert_eq!(keys.len(), 7);

        assert!(range.contains(DateKey::new(date(2017, 1, 16))));
        assert!(!range.contains(DateKey::new(date(2017, 1, 15))));
        assert!(!range.contains(DateKey::new(date(2017, 1, 23))));
    }

    #[test]
    fn empty_range_is_rejected() {
        assert!(DateRange::ending_on(date(2017, 1, 22), 0).is_err());
        assert!(DateRange::between(date(2017, 1, 22), date(2017, 1, 21)).is_err());
    }

    #[test]
    fn absorb_overwrites_present_fields_only() {
        let mut record = DailyRecord {
            weight: Some(148.4),
            fat: Some(16.0),
            ..DailyRecord::default()
        };
        record.absorb(DailyRecord {
            weight: Some(148.2),
            running: Some(3.35),
            ..DailyRecord::default()
        });
        assert_eq!(record.weight, Some(148.2));
        assert_eq!(record.fat, Some(16.0));
        assert_eq!(record.running, Some(3.35));
        assert!(!record.has(Metric::SleepStart));
    }

    #[test]
    fn chart_titles_follow_window_length() {
        let week = DateRange::ending_on(date(2017, 1, 22), 7).unwrap();
        assert_eq!(ChartSeries::Running.chart_title(&week), "Running (Week of 2017-01-15)");
        let fortnight = DateRange::ending_on(date(2017, 1, 22), 14).unwrap();
        assert_eq!(ChartSeries::Weight.chart_title(&fortnight), "Weight (since 2017-01-08)");
    }

    #[test]
    fn series_cycle_wraps() {
        assert_eq!(ChartSeries::Waketime.next(), ChartSeries::Weight);
        assert_eq!(ChartSeries::Weight.prev(), ChartSeries::Waketime);
    }
}
