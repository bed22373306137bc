//! Series extraction: project a merged dataset onto ordered numeric vectors.
//!
//! All functions here are read-only over the dataset, so extracting the same
//! series twice yields the same values.

use crate::domain::{ChartSeries, DailyRecord, DateRange, Metric};
use crate::merge::dataset::Dataset;
use crate::merge::sleep::SleepWindow;
use crate::merge::time_of_day::{center_on_mean, normalize_time_of_day};

/// Observed values per date, oldest first; `None` where the metric is absent.
///
/// Timestamp metrics are projected to their normalized time of day (seconds).
pub fn extract_observed(dataset: &Dataset, range: &DateRange, metric: Metric) -> Vec<Option<f64>> {
    range
        .keys()
        .map(|key| dataset.get(key).and_then(|record| metric_value(record, metric)))
        .collect()
}

/// One value per date, oldest first, with `default` where the metric is absent.
pub fn extract_series(dataset: &Dataset, range: &DateRange, metric: Metric, default: f64) -> Vec<f64> {
    extract_observed(dataset, range, metric)
        .into_iter()
        .map(|v| v.unwrap_or(default))
        .collect()
}

/// Hours between sleep start and end for each date that has both.
pub fn sleep_hours_series(dataset: &Dataset, range: &DateRange, default: f64) -> Vec<f64> {
    range
        .keys()
        .map(|key| {
            dataset
                .get(key)
                .and_then(|r| {
                    Some(SleepWindow {
                        start: r.sleep_start?,
                        end: r.sleep_end?,
                    })
                })
                .map(|window| window.hours())
                .unwrap_or(default)
        })
        .collect()
}

/// Deviation of a sleep timestamp from its own window average, in hours.
///
/// The mean is taken over observed dates only; absent dates get `default`.
pub fn sleep_offset_series(dataset: &Dataset, range: &DateRange, metric: Metric, default: f64) -> Vec<f64> {
    let observed = extract_observed(dataset, range, metric);
    let present: Vec<f64> = observed.iter().flatten().copied().collect();
    let mut centered = center_on_mean(&present).into_iter();

    observed
        .into_iter()
        .map(|v| match v {
            Some(_) => centered.next().unwrap_or(default),
            None => default,
        })
        .collect()
}

/// Values for a chartable series over the dataset's own window.
pub fn chart_values(dataset: &Dataset, series: ChartSeries, default: f64) -> Vec<f64> {
    let range = *dataset.range();
    match series {
        ChartSeries::Weight => extract_series(dataset, &range, Metric::Weight, default),
        ChartSeries::Fat => extract_series(dataset, &range, Metric::Fat, default),
        ChartSeries::Running => extract_series(dataset, &range, Metric::Running, default),
        ChartSeries::SleepHours => sleep_hours_series(dataset, &range, default),
        ChartSeries::Bedtime => sleep_offset_series(dataset, &range, Metric::SleepStart, default),
        ChartSeries::Waketime => sleep_offset_series(dataset, &range, Metric::SleepEnd, default),
    }
}

/// Date labels for the dataset's window, oldest first.
pub fn date_labels(range: &DateRange) -> Vec<String> {
    range.keys().map(|k| k.to_string()).collect()
}

fn metric_value(record: &DailyRecord, metric: Metric) -> Option<f64> {
    if metric.is_timestamp() {
        record.timestamp(metric).map(|t| f64::from(normalize_time_of_day(t)))
    } else {
        record.number(metric)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Days, NaiveDate, NaiveDateTime, TimeDelta};
    use proptest::prelude::*;

    use crate::domain::{DateKey, Observation};
    use crate::merge::dataset::merge_provider_records;

    fn ts(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2017, 1, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn obs(date: &str, fields: DailyRecord) -> Observation {
        Observation {
            date: DateKey::parse(date).unwrap(),
            fields,
        }
    }

    /// Three days, 2017-01-20..=2017-01-22, shaped like the demo week.
    fn sample() -> Dataset {
        let range = DateRange::ending_on(NaiveDate::from_ymd_opt(2017, 1, 22).unwrap(), 3).unwrap();
        let mut dataset = Dataset::new(range);
        merge_provider_records(
            &mut dataset,
            vec![
                obs(
                    "2017-01-20",
                    DailyRecord {
                        weight: Some(147.4),
                        sleep_start: Some(ts(20, 1, 46)),
                        sleep_end: Some(ts(20, 7, 16)),
                        ..DailyRecord::default()
                    },
                ),
                obs(
                    "2017-01-21",
                    DailyRecord {
                        weight: Some(147.0),
                        sleep_start: Some(ts(20, 23, 4)),
                        sleep_end: Some(ts(21, 7, 43)),
                        ..DailyRecord::default()
                    },
                ),
                obs(
                    "2017-01-22",
                    DailyRecord {
                        weight: Some(146.2),
                        running: Some(3.49),
                        ..DailyRecord::default()
                    },
                ),
            ],
        );
        dataset
    }

    #[test]
    fn missing_values_take_the_default() {
        let dataset = sample();
        let range = *dataset.range();
        assert_eq!(extract_series(&dataset, &range, Metric::Running, 0.0), vec![0.0, 0.0, 3.49]);
        assert_eq!(extract_series(&dataset, &range, Metric::Weight, 0.0), vec![147.4, 147.0, 146.2]);
        assert_eq!(extract_series(&dataset, &range, Metric::Fat, -1.0), vec![-1.0; 3]);
    }

    #[test]
    fn extraction_is_repeatable() {
        let dataset = sample();
        let range = *dataset.range();
        let first = extract_series(&dataset, &range, Metric::SleepStart, 0.0);
        let second = extract_series(&dataset, &range, Metric::SleepStart, 0.0);
        assert_eq!(first, second);
        // 01:46 is pushed past midnight; 23:04 is not.
        assert_eq!(first, vec![86_400.0 + 6_360.0, 83_040.0, 0.0]);
    }

    #[test]
    fn sleep_hours_need_both_ends() {
        let dataset = sample();
        let hours = sleep_hours_series(&dataset, dataset.range(), 0.0);
        assert!((hours[0] - 5.5).abs() < 1e-9);
        assert!((hours[1] - (8.0 + 39.0 / 60.0)).abs() < 1e-9);
        assert_eq!(hours[2], 0.0);
    }

    #[test]
    fn bedtime_offsets_center_on_observed_days() {
        let dataset = sample();
        let offsets = chart_values(&dataset, ChartSeries::Bedtime, 0.0);
        // Normalized bedtimes 25:46 and 23:04 average to 24:25.
        assert!((offsets[0] - 1.35).abs() < 1e-9);
        assert!((offsets[1] + 1.35).abs() < 1e-9);
        assert_eq!(offsets[2], 0.0);
    }

    #[test]
    fn labels_run_oldest_to_newest() {
        let dataset = sample();
        assert_eq!(
            date_labels(dataset.range()),
            vec!["2017-01-20", "2017-01-21", "2017-01-22"]
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
        #[test]
        fn defaults_fill_only_missing_days(
            end_offset in 0u64..3650,
            days in 1usize..40,
            entries in prop::collection::vec(
                (-60i64..10, prop::option::of(50.0f64..400.0), prop::option::of(0i64..86_400)),
                0..30,
            ),
            default in -10.0f64..10.0,
        ) {
            let end = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap() + Days::new(end_offset);
            let range = DateRange::ending_on(end, days).unwrap();
            let mut dataset = Dataset::new(range);
            let observations: Vec<Observation> = entries
                .iter()
                .map(|&(offset, weight, bedtime)| {
                    let date = end.checked_add_signed(TimeDelta::days(offset)).unwrap();
                    let midnight = date.and_hms_opt(0, 0, 0).unwrap();
                    Observation {
                        date: DateKey::new(date),
                        fields: DailyRecord {
                            weight,
                            sleep_start: bedtime.map(|s| midnight + TimeDelta::seconds(s)),
                            ..DailyRecord::default()
                        },
                    }
                })
                .collect();
            merge_provider_records(&mut dataset, observations);

            for metric in [Metric::Weight, Metric::SleepStart] {
                let first = extract_series(&dataset, &range, metric, default);
                let second = extract_series(&dataset, &range, metric, default);
                prop_assert_eq!(&first, &second);
                prop_assert_eq!(first.len(), days);

                for (value, key) in first.iter().zip(range.keys()) {
                    let record = dataset.get(key).unwrap();
                    match metric_value(record, metric) {
                        Some(observed) => {
                            prop_assert!(record.has(metric));
                            prop_assert_eq!(*value, observed);
                        }
                        None => {
                            prop_assert!(!record.has(metric));
                            prop_assert_eq!(*value, default);
                        }
                    }
                }
            }

            for series in ChartSeries::ALL {
                prop_assert_eq!(
                    chart_values(&dataset, series, default),
                    chart_values(&dataset, series, default)
                );
            }
        }
    }
}
