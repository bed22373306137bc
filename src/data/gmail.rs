//! Gmail REST API integration: labelled messages carrying a metric in the subject.

use chrono::{DateTime, TimeZone};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::Config;
use crate::data::{MailHeader, MailMessage, MailProvider, get_json, google};
use crate::domain::{DailyRecord, DateKey, Metric, Observation};
use crate::error::{AppError, MergeError};
use crate::merge::subject::{SUBJECT_HEADER, parse_subject_metric};

const BASE_URL: &str = "https://gmail.googleapis.com/gmail/v1/users/me";
const PROVIDER: &str = "Gmail";

pub struct GmailClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl GmailClient {
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Ok(Self {
            client: Client::new(),
            base_url: BASE_URL.to_string(),
            access_token: google::access_token(config)?,
        })
    }

    fn get<T: serde::de::DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T, AppError> {
        let url = format!("{}{path}", self.base_url);
        get_json(&self.client, PROVIDER, &url, &self.access_token, query)
    }
}

impl MailProvider for GmailClient {
    fn label_id(&self, name: &str) -> Result<String, AppError> {
        let body: LabelsResponse = self.get("/labels", &[])?;
        body.labels
            .into_iter()
            .find(|l| l.name == name)
            .map(|l| l.id)
            .ok_or_else(|| AppError::provider(format!("Gmail label '{name}' not found.")))
    }

    fn message_ids_for_label(&self, label_id: &str) -> Result<Vec<String>, AppError> {
        collect_pages(|page_token| {
            let mut query = vec![("labelIds", label_id)];
            if let Some(token) = page_token {
                query.push(("pageToken", token));
            }
            let body: MessagesPage = self.get("/messages", &query)?;
            Ok(Page {
                items: body.messages.into_iter().map(|m| m.id).collect(),
                next_page_token: body.next_page_token,
            })
        })
    }

    fn message(&self, id: &str) -> Result<MailMessage, AppError> {
        let body: MessageResponse = self.get(
            &format!("/messages/{id}"),
            &[("format", "metadata"), ("metadataHeaders", SUBJECT_HEADER)],
        )?;
        let internal_date_millis = body.internal_date.trim().parse::<i64>().map_err(|_| {
            AppError::provider(format!(
                "Gmail message {id} has invalid internalDate '{}'.",
                body.internal_date
            ))
        })?;
        Ok(MailMessage {
            id: body.id,
            internal_date_millis,
            headers: body.payload.map(|p| p.headers).unwrap_or_default(),
        })
    }
}

/// One page of a paged list call.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

/// Follow page tokens until the provider stops returning one.
pub fn collect_pages<T, F>(mut fetch: F) -> Result<Vec<T>, AppError>
where
    F: FnMut(Option<&str>) -> Result<Page<T>, AppError>,
{
    let mut out = Vec::new();
    let mut token: Option<String> = None;
    let mut pages = 0usize;
    loop {
        let page = fetch(token.as_deref())?;
        pages += 1;
        out.extend(page.items);
        match page.next_page_token {
            Some(next) if !next.is_empty() => token = Some(next),
            _ => break,
        }
    }
    debug!(pages, items = out.len(), "collected paged results");
    Ok(out)
}

/// Calendar date a message was received on, in `tz`.
pub fn message_date<Tz: TimeZone>(message: &MailMessage, tz: &Tz) -> Result<DateKey, MergeError> {
    let received = DateTime::from_timestamp_millis(message.internal_date_millis).ok_or_else(|| {
        MergeError::InvalidDate {
            raw: message.internal_date_millis.to_string(),
        }
    })?;
    Ok(DateKey::new(received.with_timezone(tz).date_naive()))
}

/// Running observation for a message, dated by its receive time in `tz`.
pub fn running_observation<Tz: TimeZone>(message: &MailMessage, tz: &Tz) -> Result<Observation, MergeError> {
    let date = message_date(message, tz)?;

    let subject = message.header(SUBJECT_HEADER).ok_or_else(|| MergeError::MissingHeader {
        name: SUBJECT_HEADER.to_string(),
    })?;
    let running = parse_subject_metric(Metric::Running, subject)?;

    Ok(Observation {
        date,
        fields: DailyRecord {
            running: Some(running),
            ..DailyRecord::default()
        },
    })
}

#[derive(Debug, Deserialize)]
struct LabelsResponse {
    #[serde(default)]
    labels: Vec<Label>,
}

#[derive(Debug, Deserialize)]
struct Label {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessagesPage {
    // Absent entirely when the label has no messages.
    #[serde(default)]
    messages: Vec<MessageRef>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageRef {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageResponse {
    id: String,
    internal_date: String,
    payload: Option<Payload>,
}

#[derive(Debug, Deserialize)]
struct Payload {
    #[serde(default)]
    headers: Vec<MailHeader>,
}
