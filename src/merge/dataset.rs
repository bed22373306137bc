//! The date-aligned dataset and the provider merge.

use std::collections::BTreeMap;

use tracing::debug;

use crate::domain::{DailyRecord, DateKey, DateRange, Observation};

/// Date-aligned collection of daily records for one window.
///
/// Every date in the window has an entry (possibly empty) and no other date
/// ever gets one.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    range: DateRange,
    records: BTreeMap<DateKey, DailyRecord>,
}

impl Dataset {
    /// An empty record for every date in `range`.
    pub fn new(range: DateRange) -> Self {
        let records = range.keys().map(|key| (key, DailyRecord::default())).collect();
        Self { range, records }
    }

    pub fn range(&self) -> &DateRange {
        &self.range
    }

    pub fn get(&self, key: DateKey) -> Option<&DailyRecord> {
        self.records.get(&key)
    }

    /// Records in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = (DateKey, &DailyRecord)> {
        self.records.iter().map(|(k, v)| (*k, v))
    }

    /// Merge one observation. Returns `false` when it falls outside the window.
    pub fn merge(&mut self, observation: Observation) -> bool {
        if !self.range.contains(observation.date) {
            return false;
        }
        self.records
            .entry(observation.date)
            .or_default()
            .absorb(observation.fields);
        true
    }
}

/// Counts from one merge pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub merged: usize,
    pub discarded: usize,
}

impl MergeStats {
    pub fn add(&mut self, other: MergeStats) {
        self.merged += other.merged;
        self.discarded += other.discarded;
    }
}

/// Merge a provider's observations into `dataset`, last writer wins per field.
///
/// Observations dated outside the dataset's window are dropped without error;
/// raw provider feeds routinely overshoot the requested dates.
pub fn merge_provider_records<I>(dataset: &mut Dataset, observations: I) -> MergeStats
where
    I: IntoIterator<Item = Observation>,
{
    let mut stats = MergeStats::default();
    for observation in observations {
        let date = observation.date;
        if dataset.merge(observation) {
            stats.merged += 1;
        } else {
            debug!(%date, "discarding observation outside the window");
            stats.discarded += 1;
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Days, NaiveDate, TimeDelta};
    use proptest::prelude::*;

    fn range() -> DateRange {
        DateRange::ending_on(NaiveDate::from_ymd_opt(2017, 1, 22).unwrap(), 7).unwrap()
    }

    fn obs(date: &str, fields: DailyRecord) -> Observation {
        Observation {
            date: DateKey::parse(date).unwrap(),
            fields,
        }
    }

    fn weight(v: f64) -> DailyRecord {
        DailyRecord {
            weight: Some(v),
            ..DailyRecord::default()
        }
    }

    #[test]
    fn key_set_always_matches_window() {
        let mut dataset = Dataset::new(range());
        let stats = merge_provider_records(
            &mut dataset,
            vec![
                obs("2016-12-31", weight(150.0)),
                obs("2017-01-15", weight(149.0)),
                obs("2017-01-16", weight(148.4)),
                obs("2017-01-23", weight(146.0)),
                obs("2018-01-01", weight(140.0)),
            ],
        );

        assert_eq!(stats, MergeStats { merged: 1, discarded: 4 });
        let keys: Vec<DateKey> = dataset.iter().map(|(k, _)| k).collect();
        let expected: Vec<DateKey> = range().keys().collect();
        assert_eq!(keys, expected);
        assert_eq!(dataset.get(DateKey::parse("2017-01-16").unwrap()).unwrap().weight, Some(148.4));
        assert!(dataset.get(DateKey::parse("2017-01-15").unwrap()).is_none());
    }

    #[test]
    fn later_merges_overwrite_same_field_and_keep_others() {
        let mut dataset = Dataset::new(range());
        merge_provider_records(
            &mut dataset,
            vec![obs(
                "2017-01-17",
                DailyRecord {
                    weight: Some(148.2),
                    fat: Some(16.1),
                    ..DailyRecord::default()
                },
            )],
        );
        merge_provider_records(
            &mut dataset,
            vec![
                obs(
                    "2017-01-17",
                    DailyRecord {
                        running: Some(3.35),
                        ..DailyRecord::default()
                    },
                ),
                obs("2017-01-17", weight(147.9)),
            ],
        );

        let record = dataset.get(DateKey::parse("2017-01-17").unwrap()).unwrap();
        assert_eq!(record.weight, Some(147.9));
        assert_eq!(record.fat, Some(16.1));
        assert_eq!(record.running, Some(3.35));
    }

    #[test]
    fn empty_provider_pass_leaves_dataset_untouched() {
        let mut dataset = Dataset::new(range());
        let before = dataset.clone();
        let stats = merge_provider_records(&mut dataset, Vec::new());
        assert_eq!(stats, MergeStats::default());
        assert_eq!(dataset, before);
        assert!(dataset.iter().all(|(_, r)| r.is_empty()));
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
        #[test]
        fn window_keys_hold_for_any_observations(
            end_offset in 0u64..3650,
            days in 1usize..60,
            offsets in prop::collection::vec(-90i64..30, 0..40),
        ) {
            let end = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap() + Days::new(end_offset);
            let range = DateRange::ending_on(end, days).unwrap();
            let mut dataset = Dataset::new(range);

            // Weight = position in the feed, so the last writer is identifiable.
            let observations: Vec<Observation> = offsets
                .iter()
                .enumerate()
                .map(|(i, &o)| Observation {
                    date: DateKey::new(end.checked_add_signed(TimeDelta::days(o)).unwrap()),
                    fields: weight(i as f64),
                })
                .collect();
            let in_window = |o: i64| o <= 0 && o > -(days as i64);

            let stats = merge_provider_records(&mut dataset, observations);

            let keys: Vec<DateKey> = dataset.iter().map(|(k, _)| k).collect();
            prop_assert_eq!(keys, range.keys().collect::<Vec<_>>());
            prop_assert_eq!(stats.merged, offsets.iter().filter(|&&o| in_window(o)).count());
            prop_assert_eq!(stats.merged + stats.discarded, offsets.len());

            for (key, record) in dataset.iter() {
                let o = (key.date() - end).num_days();
                let last = offsets.iter().rposition(|&x| x == o).map(|i| i as f64);
                prop_assert_eq!(record.weight, last);
            }
        }
    }
}
