//! Provider clients.
//!
//! Each provider is exposed through a small typed capability trait so the
//! pipeline can run against the real HTTP clients or against in-memory fakes.
//! Clients are built once per run from `Config` and passed by reference.

use reqwest::blocking::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use chrono::NaiveDate;

use crate::error::AppError;

pub mod fitbit;
pub mod gmail;
pub mod google;
pub mod plaid;
pub mod rescuetime;

pub use fitbit::FitbitClient;
pub use gmail::GmailClient;
pub use plaid::PlaidClient;
pub use rescuetime::RescueTimeClient;

/// One body-weight log entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WeightLog {
    /// `YYYY-MM-DD`.
    pub date: String,
    pub weight: f64,
    #[serde(default)]
    pub fat: Option<f64>,
}

/// One sleep period as reported by the fitness provider.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepSegment {
    pub is_main_sleep: bool,
    /// Local ISO-8601 timestamp without offset.
    pub start_time: String,
    /// Milliseconds.
    pub duration: i64,
    /// `YYYY-MM-DD` the provider attributes the sleep to.
    pub date_of_sleep: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MailHeader {
    pub name: String,
    pub value: String,
}

/// The parts of a mail message the merge needs.
#[derive(Debug, Clone, PartialEq)]
pub struct MailMessage {
    pub id: String,
    /// Receive time, milliseconds since the Unix epoch.
    pub internal_date_millis: i64,
    pub headers: Vec<MailHeader>,
}

impl MailMessage {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name == name)
            .map(|h| h.value.as_str())
    }
}

/// Fitness tracker capabilities.
pub trait FitnessProvider {
    /// Weight logs between `start` and `end`, inclusive.
    fn body_weight(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<WeightLog>, AppError>;

    /// All sleep segments the provider attributes to `date`.
    fn sleep(&self, date: NaiveDate) -> Result<Vec<SleepSegment>, AppError>;
}

/// Mailbox capabilities.
pub trait MailProvider {
    fn label_id(&self, name: &str) -> Result<String, AppError>;

    /// Every message id carrying the label, across all pages.
    fn message_ids_for_label(&self, label_id: &str) -> Result<Vec<String>, AppError>;

    fn message(&self, id: &str) -> Result<MailMessage, AppError>;
}

/// Authenticated GET returning a decoded JSON body.
pub(crate) fn get_json<T: DeserializeOwned>(
    client: &Client,
    provider: &str,
    url: &str,
    token: &str,
    query: &[(&str, &str)],
) -> Result<T, AppError> {
    debug!(provider, url, "GET");
    let resp = client
        .get(url)
        .bearer_auth(token)
        .query(query)
        .send()
        .map_err(|e| AppError::provider(format!("{provider} request failed: {e}")))?;

    if !resp.status().is_success() {
        return Err(AppError::provider(format!(
            "{provider} request failed with status {}.",
            resp.status()
        )));
    }

    resp.json()
        .map_err(|e| AppError::provider(format!("Failed to parse {provider} response: {e}")))
}
