//! Plaid (financial accounts aggregator) credentials.
//!
//! No account data is consumed yet; the client only validates that both
//! credentials are configured and keeps the public client id.

use crate::config::{self, Config};
use crate::error::AppError;

pub struct PlaidClient {
    client_id: String,
}

impl PlaidClient {
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let client_id = config.get(config::PLAID_CLIENT_ID)?.to_string();
        config.get(config::PLAID_SECRET_KEY)?;
        Ok(Self { client_id })
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }
}
