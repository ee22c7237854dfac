//! API server configuration

use agentfront_billing::BillingConfig;

/// Server configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the server binds to, e.g. "0.0.0.0:8080".
    pub bind_address: String,
    /// Origins allowed by CORS.
    pub allowed_origins: Vec<String>,
    /// Billing collaborator settings.
    pub billing: BillingConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        // Default to localhost for development; production sets ALLOWED_ORIGINS.
        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let billing = BillingConfig::from_env()?;

        Ok(Self {
            bind_address,
            allowed_origins,
            billing,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn from_env_uses_defaults_for_optional_values() {
        std::env::set_var("BILLING_API_URL", "https://billing.example.com");
        std::env::remove_var("BIND_ADDRESS");
        std::env::remove_var("ALLOWED_ORIGINS");

        let config = Config::from_env().unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:8080");
        assert_eq!(config.allowed_origins.len(), 2);
        assert_eq!(config.billing.base_url, "https://billing.example.com");

        std::env::remove_var("BILLING_API_URL");
    }

    #[test]
    #[serial]
    fn from_env_splits_and_trims_origins() {
        std::env::set_var("BILLING_API_URL", "https://billing.example.com");
        std::env::set_var(
            "ALLOWED_ORIGINS",
            "https://app.example.com , https://www.example.com",
        );

        let config = Config::from_env().unwrap();
        assert_eq!(
            config.allowed_origins,
            vec![
                "https://app.example.com".to_string(),
                "https://www.example.com".to_string()
            ]
        );

        std::env::remove_var("ALLOWED_ORIGINS");
        std::env::remove_var("BILLING_API_URL");
    }
}
