//! Billing backend configuration

use crate::error::{BillingError, BillingResult};

/// Connection settings for the billing collaborator.
#[derive(Debug, Clone)]
pub struct BillingConfig {
    /// Base URL of the billing backend, e.g. `https://api.example.com`.
    pub base_url: String,
    /// Where checkout sends the viewer back on success or cancel.
    pub return_url: String,
}

impl BillingConfig {
    pub fn new(base_url: impl Into<String>, return_url: impl Into<String>) -> Self {
        Self {
            base_url: trim_trailing_slash(base_url.into()),
            return_url: return_url.into(),
        }
    }

    /// Load from environment variables.
    ///
    /// Requires `BILLING_API_URL`; `BILLING_RETURN_URL` defaults to "/".
    pub fn from_env() -> BillingResult<Self> {
        let base_url = std::env::var("BILLING_API_URL")
            .map_err(|_| BillingError::Config("BILLING_API_URL not set".to_string()))?;
        let return_url =
            std::env::var("BILLING_RETURN_URL").unwrap_or_else(|_| "/".to_string());
        Ok(Self::new(base_url, return_url))
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn trim_trailing_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}
