//! RescueTime (time tracking) credentials.
//!
//! Documentation: https://www.rescuetime.com/anapi/setup/documentation

use crate::config::{self, Config};
use crate::error::AppError;

pub struct RescueTimeClient {
    api_key: String,
}

impl RescueTimeClient {
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Ok(Self {
            api_key: config.get(config::RESCUETIME_API_KEY)?.to_string(),
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}
