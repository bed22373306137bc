//! Credential and settings store.
//!
//! Values come from a dotenv file (`.env` by default) plus the process
//! environment, which wins on conflicts. The store is built once at startup
//! and only read afterwards.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::error::AppError;

pub const FITBIT_CLIENT_ID: &str = "FITBIT_CLIENT_ID";
pub const FITBIT_CLIENT_SECRET: &str = "FITBIT_CLIENT_SECRET";
pub const FITBIT_ACCESS_TOKEN: &str = "FITBIT_ACCESS_TOKEN";
pub const FITBIT_REFRESH_TOKEN: &str = "FITBIT_REFRESH_TOKEN";
pub const GOOGLE_ACCESS_TOKEN: &str = "GOOGLE_ACCESS_TOKEN";
pub const GOOGLE_API_CLIENT_AUTH_FILEPATH: &str = "GOOGLE_API_CLIENT_AUTH_FILEPATH";
pub const PLAID_CLIENT_ID: &str = "PLAID_CLIENT_ID";
pub const PLAID_SECRET_KEY: &str = "PLAID_SECRET_KEY";
pub const RESCUETIME_API_KEY: &str = "RESCUETIME_API_KEY";

#[derive(Debug, Clone, Default)]
pub struct Config {
    values: HashMap<String, String>,
}

impl Config {
    /// Load `path` if given, else `.env` from the working directory (if any).
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let mut values = HashMap::new();

        match path {
            Some(path) => {
                let entries = dotenvy::from_path_iter(path).map_err(|e| {
                    AppError::config(format!("Failed to open config '{}': {e}", path.display()))
                })?;
                for entry in entries {
                    let (key, value) = entry.map_err(|e| {
                        AppError::config(format!("Invalid entry in config '{}': {e}", path.display()))
                    })?;
                    values.insert(key, value);
                }
                debug!(path = %path.display(), entries = values.len(), "loaded config file");
            }
            None => {
                if let Ok(path) = dotenvy::dotenv() {
                    debug!(path = %path.display(), "loaded .env");
                }
            }
        }

        values.extend(std::env::vars());
        Ok(Self { values })
    }

    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            values: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Required value; missing or blank keys are a configuration error.
    pub fn get(&self, key: &str) -> Result<&str, AppError> {
        self.get_opt(key)
            .ok_or_else(|| AppError::config(format!("Missing {key} in configuration (.env).")))
    }

    pub fn get_opt(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use crate::error::EXIT_CONFIG;

    #[test]
    fn missing_and_blank_keys_are_errors() {
        let config = Config::from_pairs([(FITBIT_ACCESS_TOKEN, "abc"), (PLAID_CLIENT_ID, "  ")]);
        assert_eq!(config.get(FITBIT_ACCESS_TOKEN).unwrap(), "abc");
        assert!(config.get_opt(PLAID_CLIENT_ID).is_none());

        let err = config.get(RESCUETIME_API_KEY).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_CONFIG);
        assert!(err.message().contains(RESCUETIME_API_KEY));
    }

    #[test]
    fn explicit_file_is_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "LIFEDB_TEST_ONLY_KEY=from-file").unwrap();
        writeln!(file, "# comment").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.get("LIFEDB_TEST_ONLY_KEY").unwrap(), "from-file");
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = Config::load(Some(Path::new("/nonexistent/lifedb.env"))).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_CONFIG);
    }
}
