//! Metric extraction from mail subjects.
//!
//! Senders follow a simple convention: the subject starts with the number,
//! e.g. `3.49 miles, 32:10`.

use crate::domain::Metric;
use crate::error::MergeError;

pub const SUBJECT_HEADER: &str = "Subject";

/// Parse the first whitespace-delimited token of `subject` as a float.
pub fn parse_subject_metric(metric: Metric, subject: &str) -> Result<f64, MergeError> {
    let unparsable = || MergeError::UnparsableMetricValue {
        metric,
        raw: subject.to_string(),
    };

    let token = subject.split_whitespace().next().ok_or_else(unparsable)?;
    let value = token.parse::<f64>().map_err(|_| unparsable())?;
    if value.is_finite() { Ok(value) } else { Err(unparsable()) }
}
