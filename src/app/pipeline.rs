//! Shared "collect" logic used by the CLI commands and the TUI.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! weights -> sleep per day -> running mail -> merged dataset
//!
//! Providers are queried strictly one after another and each result is merged
//! as soon as it arrives.

use chrono::{Local, TimeZone};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::data::fitbit::weight_observation;
use crate::data::gmail::{message_date, running_observation};
use crate::data::{FitbitClient, FitnessProvider, GmailClient, MailProvider};
use crate::domain::{DateKey, DateRange, Provider, RunConfig};
use crate::error::{AppError, MergeError};
use crate::merge::{Dataset, MergeStats, merge_provider_records, sleep_observation};

/// Provider clients for one run, each built at most once.
pub struct Sources {
    pub fitbit: Option<FitbitClient>,
    pub gmail: Option<GmailClient>,
}

impl Sources {
    /// Build the clients the run uses; skipped providers are never constructed.
    pub fn from_config(config: &Config, run: &RunConfig) -> Result<Self, AppError> {
        let fitbit = if run.uses(Provider::Fitbit) {
            Some(FitbitClient::from_config(config)?)
        } else {
            None
        };
        let gmail = if run.uses(Provider::Gmail) {
            Some(GmailClient::from_config(config)?)
        } else {
            None
        };
        Ok(Self { fitbit, gmail })
    }
}

/// What each provider contributed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectReport {
    pub weight: MergeStats,
    pub sleep: MergeStats,
    pub running: MergeStats,
    /// Dates whose sleep query had no main sleep segment.
    pub skipped_sleep: Vec<DateKey>,
}

/// All computed outputs of a single collect run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub dataset: Dataset,
    pub report: CollectReport,
}

/// The window a run covers: `days` ending on `end_date` (today if unset).
pub fn resolve_range(run: &RunConfig) -> Result<DateRange, AppError> {
    let end = run.end_date.unwrap_or_else(|| Local::now().date_naive());
    DateRange::ending_on(end, run.days)
}

/// Build the dataset for a run: from a saved snapshot, or from the providers.
pub fn run_collect(run: &RunConfig, config: &Config) -> Result<RunOutput, AppError> {
    if let Some(path) = &run.dataset {
        let dataset = crate::io::dataset::read_dataset_json(path)?;
        info!(path = %path.display(), days = dataset.range().num_days(), "loaded dataset snapshot");
        return Ok(RunOutput {
            dataset,
            report: CollectReport::default(),
        });
    }

    let range = resolve_range(run)?;
    let sources = Sources::from_config(config, run)?;
    collect_dataset(range, &sources, run)
}

/// Query the configured providers for `range`.
pub fn collect_dataset(range: DateRange, sources: &Sources, run: &RunConfig) -> Result<RunOutput, AppError> {
    collect_with(range, sources.fitbit.as_ref(), sources.gmail.as_ref(), run, &Local)
}

/// Provider-agnostic collect; mail receive times are dated in `tz`.
pub fn collect_with<F, M, Tz>(
    range: DateRange,
    fitness: Option<&F>,
    mail: Option<&M>,
    run: &RunConfig,
    tz: &Tz,
) -> Result<RunOutput, AppError>
where
    F: FitnessProvider,
    M: MailProvider,
    Tz: TimeZone,
{
    let mut dataset = Dataset::new(range);
    let mut report = CollectReport::default();

    if let Some(fitness) = fitness {
        report.weight = merge_weights(&mut dataset, fitness)?;
        let (stats, skipped) = merge_sleep(&mut dataset, fitness, run.strict_sleep)?;
        report.sleep = stats;
        report.skipped_sleep = skipped;
    }

    if let Some(mail) = mail {
        report.running = merge_running(&mut dataset, mail, &run.running_label, tz)?;
    }

    info!(
        start = %range.start(),
        end = %range.end(),
        weight = report.weight.merged,
        sleep = report.sleep.merged,
        running = report.running.merged,
        "collected dataset"
    );

    Ok(RunOutput { dataset, report })
}

fn merge_weights<F: FitnessProvider>(dataset: &mut Dataset, fitness: &F) -> Result<MergeStats, AppError> {
    let range = *dataset.range();
    let logs = fitness.body_weight(range.start().date(), range.end().date())?;
    let observations = logs
        .iter()
        .map(weight_observation)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(merge_provider_records(dataset, observations))
}

fn merge_sleep<F: FitnessProvider>(
    dataset: &mut Dataset,
    fitness: &F,
    strict: bool,
) -> Result<(MergeStats, Vec<DateKey>), AppError> {
    let range = *dataset.range();
    let mut stats = MergeStats::default();
    let mut skipped = Vec::new();

    for date in range.keys() {
        let segments = fitness.sleep(date.date())?;
        match sleep_observation(date, &segments) {
            Ok(observation) => stats.add(merge_provider_records(dataset, [observation])),
            Err(MergeError::NoMainSleepSegment { date }) if !strict => {
                warn!(%date, segments = segments.len(), "no main sleep segment; skipping date");
                skipped.push(date);
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok((stats, skipped))
}

fn merge_running<M: MailProvider, Tz: TimeZone>(
    dataset: &mut Dataset,
    mail: &M,
    label: &str,
    tz: &Tz,
) -> Result<MergeStats, AppError> {
    let label_id = mail.label_id(label)?;
    let ids = mail.message_ids_for_label(&label_id)?;
    debug!(label, messages = ids.len(), "fetched labelled messages");

    // Every labelled message is fetched; the window is applied afterwards.
    let mut stats = MergeStats::default();
    let mut observations = Vec::new();
    for id in &ids {
        let message = mail.message(id)?;
        let date = message_date(&message, tz)?;
        if !dataset.range().contains(date) {
            debug!(%date, id = %id, "discarding message outside the window");
            stats.discarded += 1;
            continue;
        }
        observations.push(running_observation(&message, tz)?);
    }

    stats.add(merge_provider_records(dataset, observations));
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use chrono::{NaiveDate, Utc};
    use tracing_test::traced_test;

    use crate::data::{MailHeader, MailMessage, SleepSegment, WeightLog};
    use crate::error::EXIT_DATA;

    struct FakeFitness {
        weights: Vec<WeightLog>,
        sleep: HashMap<NaiveDate, Vec<SleepSegment>>,
    }

    impl FitnessProvider for FakeFitness {
        fn body_weight(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<WeightLog>, AppError> {
            // Providers may overshoot the requested window; keep one stray entry.
            assert!(start <= end);
            Ok(self.weights.clone())
        }

        fn sleep(&self, date: NaiveDate) -> Result<Vec<SleepSegment>, AppError> {
            Ok(self.sleep.get(&date).cloned().unwrap_or_default())
        }
    }

    struct FakeMail {
        messages: Vec<MailMessage>,
    }

    impl MailProvider for FakeMail {
        fn label_id(&self, name: &str) -> Result<String, AppError> {
            if name == "Running" {
                Ok("Label_7".to_string())
            } else {
                Err(AppError::provider(format!("Gmail label '{name}' not found.")))
            }
        }

        fn message_ids_for_label(&self, label_id: &str) -> Result<Vec<String>, AppError> {
            assert_eq!(label_id, "Label_7");
            Ok(self.messages.iter().map(|m| m.id.clone()).collect())
        }

        fn message(&self, id: &str) -> Result<MailMessage, AppError> {
            self.messages
                .iter()
                .find(|m| m.id == id)
                .cloned()
                .ok_or_else(|| AppError::provider("no such message"))
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2017, 1, d).unwrap()
    }

    fn range() -> DateRange {
        DateRange::ending_on(day(22), 7).unwrap()
    }

    fn weight(date: &str, w: f64, fat: f64) -> WeightLog {
        WeightLog {
            date: date.to_string(),
            weight: w,
            fat: Some(fat),
        }
    }

    fn segment(main: bool, start: &str, duration: i64, date: &str) -> SleepSegment {
        SleepSegment {
            is_main_sleep: main,
            start_time: start.to_string(),
            duration,
            date_of_sleep: date.to_string(),
        }
    }

    fn mail(id: &str, millis: i64, subject: &str) -> MailMessage {
        MailMessage {
            id: id.to_string(),
            internal_date_millis: millis,
            headers: vec![MailHeader {
                name: "Subject".to_string(),
                value: subject.to_string(),
            }],
        }
    }

    fn fitness() -> FakeFitness {
        let mut sleep = HashMap::new();
        sleep.insert(
            day(16),
            vec![segment(true, "2017-01-15T22:41:30.000", 32_880_000, "2017-01-16")],
        );
        sleep.insert(
            day(20),
            vec![segment(false, "2017-01-20T15:00:00.000", 1_800_000, "2017-01-20")],
        );
        FakeFitness {
            weights: vec![
                weight("2017-01-10", 150.0, 17.0),
                weight("2017-01-16", 148.4, 16.0),
                weight("2017-01-22", 146.2, 15.5),
            ],
            sleep,
        }
    }

    fn mailbox() -> FakeMail {
        FakeMail {
            messages: vec![
                // 2017-01-22T03:30:00Z
                mail("in", 1_485_055_800_000, "3.49 miles, 32:10"),
                // 2016-12-01T12:00:00Z, outside the window and never parsed
                mail("old", 1_480_593_600_000, "garbage subject"),
            ],
        }
    }

    #[test]
    fn merges_all_providers_into_the_window() {
        let run = RunConfig::default();
        let out = collect_with(range(), Some(&fitness()), Some(&mailbox()), &run, &Utc).unwrap();

        let keys: Vec<DateKey> = out.dataset.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, range().keys().collect::<Vec<_>>());

        let jan16 = out.dataset.get(DateKey::new(day(16))).unwrap();
        assert_eq!(jan16.weight, Some(148.4));
        assert_eq!(
            jan16.sleep_end,
            Some(day(16).and_hms_opt(7, 49, 30).unwrap())
        );

        let jan22 = out.dataset.get(DateKey::new(day(22))).unwrap();
        assert_eq!(jan22.weight, Some(146.2));
        assert_eq!(jan22.running, Some(3.49));

        assert_eq!(out.report.weight, MergeStats { merged: 2, discarded: 1 });
        assert_eq!(out.report.running, MergeStats { merged: 1, discarded: 1 });
        assert_eq!(out.report.sleep.merged, 1);
        // Only day 16 has a main segment; every other day is skipped.
        assert_eq!(out.report.skipped_sleep.len(), 6);
        assert!(out.report.skipped_sleep.contains(&DateKey::new(day(20))));
    }

    #[test]
    #[traced_test]
    fn out_of_window_mail_is_logged_and_counted() {
        let run = RunConfig::default();
        let out = collect_with(range(), None::<&FakeFitness>, Some(&mailbox()), &run, &Utc).unwrap();

        assert_eq!(out.report.running, MergeStats { merged: 1, discarded: 1 });
        assert!(logs_contain("discarding message outside the window"));
        assert!(logs_contain("id=old"));
    }

    #[test]
    fn strict_sleep_aborts_on_missing_main_segment() {
        let run = RunConfig {
            strict_sleep: true,
            ..RunConfig::default()
        };
        let err = collect_with(range(), Some(&fitness()), None::<&FakeMail>, &run, &Utc).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_DATA);
        assert!(err.message().contains("no main sleep segment"));
    }

    #[test]
    fn unparsable_subject_in_window_aborts() {
        let mail = FakeMail {
            messages: vec![mail("bad", 1_485_055_800_000, "not a number")],
        };
        let run = RunConfig::default();
        let err = collect_with(range(), None::<&FakeFitness>, Some(&mail), &run, &Utc).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_DATA);
    }

    #[test]
    fn unknown_label_is_a_provider_error() {
        let run = RunConfig {
            running_label: "Cycling".to_string(),
            ..RunConfig::default()
        };
        let err = collect_with(range(), None::<&FakeFitness>, Some(&mailbox()), &run, &Utc).unwrap_err();
        assert!(err.message().contains("Cycling"));
    }

    #[test]
    fn end_date_pins_the_window() {
        let run = RunConfig {
            days: 3,
            end_date: Some(day(22)),
            ..RunConfig::default()
        };
        let range = resolve_range(&run).unwrap();
        assert_eq!(range.start(), DateKey::new(day(20)));
        assert_eq!(range.end(), DateKey::new(day(22)));
    }
}
