//! Google API access tokens.
//!
//! Tokens are never negotiated here. Either `GOOGLE_ACCESS_TOKEN` is set, or
//! `GOOGLE_API_CLIENT_AUTH_FILEPATH` points at a stored OAuth credential file
//! whose `access_token` field is used as-is.

use std::fs::File;
use std::path::Path;

use serde::Deserialize;

use crate::config::{self, Config};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
struct StoredCredential {
    access_token: Option<String>,
    #[serde(default)]
    invalid: bool,
}

pub fn access_token(config: &Config) -> Result<String, AppError> {
    if let Some(token) = config.get_opt(config::GOOGLE_ACCESS_TOKEN) {
        return Ok(token.to_string());
    }

    let path = config.get_opt(config::GOOGLE_API_CLIENT_AUTH_FILEPATH).ok_or_else(|| {
        AppError::config(format!(
            "Missing {} or {} in configuration (.env).",
            config::GOOGLE_ACCESS_TOKEN,
            config::GOOGLE_API_CLIENT_AUTH_FILEPATH
        ))
    })?;
    read_stored_token(Path::new(path))
}

fn read_stored_token(path: &Path) -> Result<String, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::config(format!("Failed to open Google credentials '{}': {e}", path.display()))
    })?;
    let stored: StoredCredential = serde_json::from_reader(file)
        .map_err(|e| AppError::config(format!("Invalid Google credentials '{}': {e}", path.display())))?;

    if stored.invalid {
        return Err(AppError::config(format!(
            "Google credentials '{}' are marked invalid; re-authorize and store a fresh token.",
            path.display()
        )));
    }
    stored
        .access_token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::config(format!("No access_token in '{}'.", path.display())))
}
