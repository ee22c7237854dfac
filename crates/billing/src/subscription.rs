//! Viewer subscription state
//!
//! The billing backend owns subscription state; this module fetches it
//! read-only and never caches it beyond the caller's lifetime.

use serde::{Deserialize, Serialize};

use crate::config::BillingConfig;
use crate::error::{BillingError, BillingResult};

/// Lifecycle state of the viewer's subscription as reported by the
/// billing backend. `NoSubscription` is the explicit "never subscribed"
/// marker, distinct from a missing status record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionState {
    Active,
    Trialing,
    PastDue,
    Canceled,
    NoSubscription,
    /// Forward-compatible catch-all for states this view does not
    /// distinguish.
    #[serde(other)]
    Other,
}

impl SubscriptionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionState::Active => "active",
            SubscriptionState::Trialing => "trialing",
            SubscriptionState::PastDue => "past_due",
            SubscriptionState::Canceled => "canceled",
            SubscriptionState::NoSubscription => "no_subscription",
            SubscriptionState::Other => "other",
        }
    }
}

/// The viewer's current subscription, as returned by
/// `GET /billing/subscription`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionStatus {
    /// Identifier of the active plan; None on the free tier.
    pub price_id: Option<String>,
    pub status: SubscriptionState,
    /// Whether a plan change is pending at period end.
    #[serde(default)]
    pub has_schedule: bool,
    /// Identifier of the pending plan when `has_schedule` is set.
    #[serde(default)]
    pub scheduled_price_id: Option<String>,
}

impl SubscriptionStatus {
    /// A status representing a viewer who has never subscribed.
    pub fn none() -> Self {
        Self {
            price_id: None,
            status: SubscriptionState::NoSubscription,
            has_schedule: false,
            scheduled_price_id: None,
        }
    }

    /// Whether `price_id` names the active plan.
    pub fn is_active_plan(&self, price_id: &str) -> bool {
        self.price_id.as_deref() == Some(price_id)
    }

    /// Whether `price_id` names the plan a pending change targets.
    pub fn is_scheduled_plan(&self, price_id: &str) -> bool {
        self.has_schedule && self.scheduled_price_id.as_deref() == Some(price_id)
    }
}

/// Read-only client for the subscription status endpoint.
#[derive(Debug, Clone)]
pub struct SubscriptionClient {
    config: BillingConfig,
    http: reqwest::Client,
}

impl SubscriptionClient {
    pub fn new(config: BillingConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }

    /// Fetch the viewer's subscription. An auth failure (401/403) means
    /// the viewer is not signed in and maps to `Ok(None)`; everything
    /// else is an error.
    pub async fn fetch(&self, access_token: Option<&str>) -> BillingResult<Option<SubscriptionStatus>> {
        let url = self.config.endpoint("/billing/subscription");
        let mut request = self.http.get(&url);
        if let Some(token) = access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            tracing::debug!(status = status.as_u16(), "Viewer is not authenticated");
            return Ok(None);
        }

        if !status.is_success() {
            let detail = extract_error_detail(response).await;
            return Err(BillingError::Api {
                status: status.as_u16(),
                detail,
            });
        }

        let subscription: SubscriptionStatus = response
            .json()
            .await
            .map_err(|e| BillingError::InvalidResponse(e.to_string()))?;

        tracing::debug!(
            price_id = ?subscription.price_id,
            status = subscription.status.as_str(),
            has_schedule = subscription.has_schedule,
            "Fetched subscription status"
        );

        Ok(Some(subscription))
    }
}

/// Pull the `detail` field out of an error body, falling back to the
/// raw text.
pub(crate) async fn extract_error_detail(response: reqwest::Response) -> String {
    let text = response.text().await.unwrap_or_default();
    serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(String::from))
        .unwrap_or(text)
}
