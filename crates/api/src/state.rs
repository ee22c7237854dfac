//! Application state

use std::sync::Arc;

use agentfront_billing::{CheckoutClient, SubscriptionClient, TierCatalog};
use reqwest::Client;

use crate::config::Config;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Static tier catalog, resolved per request against viewer state.
    pub catalog: Arc<TierCatalog>,
    pub subscriptions: SubscriptionClient,
    pub checkout: CheckoutClient,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        // One HTTP client shared by both billing collaborators.
        let http_client = Client::new();
        let subscriptions = SubscriptionClient::new(config.billing.clone(), http_client.clone());
        let checkout = CheckoutClient::new(config.billing.clone(), http_client);

        tracing::info!(
            billing_api = %config.billing.base_url,
            "Billing clients initialized"
        );

        Self {
            config,
            catalog: Arc::new(TierCatalog::default()),
            subscriptions,
            checkout,
        }
    }
}
