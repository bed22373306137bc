//! Fitbit Web API integration: body weight logs and sleep.

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::config::{self, Config};
use crate::data::{FitnessProvider, SleepSegment, WeightLog, get_json};
use crate::domain::{DailyRecord, DateKey, Observation};
use crate::error::{AppError, MergeError};

const BASE_URL: &str = "https://api.fitbit.com";
const PROVIDER: &str = "Fitbit";

pub struct FitbitClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl FitbitClient {
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let access_token = config.get(config::FITBIT_ACCESS_TOKEN)?.to_string();
        Ok(Self {
            client: Client::new(),
            base_url: BASE_URL.to_string(),
            access_token,
        })
    }

    fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let url = format!("{}{path}", self.base_url);
        get_json(&self.client, PROVIDER, &url, &self.access_token, &[])
    }
}

impl FitnessProvider for FitbitClient {
    fn body_weight(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<WeightLog>, AppError> {
        let body: WeightResponse = self.get(&format!("/1/user/-/body/log/weight/date/{start}/{end}.json"))?;
        Ok(body.weight)
    }

    fn sleep(&self, date: NaiveDate) -> Result<Vec<SleepSegment>, AppError> {
        let body: SleepResponse = self.get(&format!("/1.2/user/-/sleep/date/{date}.json"))?;
        Ok(body.sleep)
    }
}

#[derive(Debug, Deserialize)]
struct WeightResponse {
    #[serde(default)]
    weight: Vec<WeightLog>,
}

#[derive(Debug, Deserialize)]
struct SleepResponse {
    #[serde(default)]
    sleep: Vec<SleepSegment>,
}

/// Weight and body fat observation for a log entry's own date.
pub fn weight_observation(log: &WeightLog) -> Result<Observation, MergeError> {
    Ok(Observation {
        date: DateKey::parse(&log.date)?,
        fields: DailyRecord {
            weight: Some(log.weight),
            fat: log.fat,
            ..DailyRecord::default()
        },
    })
}
