//! Error types.
//!
//! `AppError` is what the binary ultimately reports: a message plus the process
//! exit code. `MergeError` is the narrower taxonomy of the merge core; it
//! converts into `AppError` with the data exit code.

use thiserror::Error;

use crate::domain::{DateKey, Metric};

/// Configuration problems and local file I/O.
pub const EXIT_CONFIG: u8 = 2;
/// Provider data that cannot be merged.
pub const EXIT_DATA: u8 = 3;
/// Provider requests, network, and terminal failures.
pub const EXIT_PROVIDER: u8 = 4;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(EXIT_CONFIG, message)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(EXIT_PROVIDER, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Failures while turning provider records into mergeable observations.
///
/// Out-of-range observations are not represented here: they are dropped
/// silently by the merge.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MergeError {
    /// The sleep query for a date returned no segment flagged as main sleep.
    #[error("no main sleep segment for {date}")]
    NoMainSleepSegment { date: DateKey },

    /// A provider value could not be converted to the metric's type.
    #[error("unparsable {metric} value: '{raw}'")]
    UnparsableMetricValue { metric: Metric, raw: String },

    /// A date (provider-native or typed in) could not be converted to a `DateKey`.
    #[error("invalid date: '{raw}'")]
    InvalidDate { raw: String },

    /// A mail message lacks the header the metric is read from.
    #[error("message has no '{name}' header")]
    MissingHeader { name: String },
}

impl From<MergeError> for AppError {
    fn from(err: MergeError) -> Self {
        AppError::new(EXIT_DATA, err.to_string())
    }
}
