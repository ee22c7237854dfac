//! Checkout session orchestration
//!
//! Creating a checkout session is the one write this crate performs
//! against the billing backend. The backend decides what actually
//! happens (fresh checkout, in-place upgrade, scheduled downgrade, no
//! change) and reports it through `status`; [`interpret`] maps every
//! status to a viewer notification and at most one side effect.

use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::OffsetDateTime;

use crate::config::BillingConfig;
use crate::error::{BillingError, BillingResult};
use crate::notify::Notification;
use crate::subscription::extract_error_detail;

/// Request body for `POST /billing/create-checkout-session`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateCheckoutSession {
    pub price_id: String,
    pub success_url: String,
    pub cancel_url: String,
}

/// What the billing backend did with the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStatus {
    New,
    CheckoutCreated,
    Upgraded,
    Updated,
    DowngradeScheduled,
    Scheduled,
    NoChange,
    /// Any status this build does not know. Takes the warning branch
    /// instead of failing deserialization.
    #[serde(other)]
    Unknown,
}

/// Before/after prices attached to an upgrade response.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UpgradeDetails {
    pub is_upgrade: bool,
    pub current_price: f64,
    pub new_price: f64,
}

/// Response of `POST /billing/create-checkout-session`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CheckoutSessionResponse {
    pub status: CheckoutStatus,
    /// Redirect target for `new` / `checkout_created`.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub details: Option<UpgradeDetails>,
    /// When a scheduled change takes effect.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub effective_date: Option<OffsetDateTime>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Side effect the caller must apply after a checkout response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CheckoutEffect {
    /// Full-page redirect to the external checkout URL.
    Redirect { url: String },
    /// The subscription changed server-side; refetch it.
    RefreshSubscription,
    None,
}

/// Interpreted checkout response: what to tell the viewer and what to do.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutOutcome {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notification>,
    pub effect: CheckoutEffect,
}

/// Map a checkout response to a notification and an effect, one branch
/// per status.
pub fn interpret(response: &CheckoutSessionResponse) -> CheckoutOutcome {
    match response.status {
        CheckoutStatus::New | CheckoutStatus::CheckoutCreated => match &response.url {
            Some(url) => CheckoutOutcome {
                notification: None,
                effect: CheckoutEffect::Redirect { url: url.clone() },
            },
            None => {
                tracing::error!(
                    status = ?response.status,
                    "Checkout session created without a redirect URL"
                );
                CheckoutOutcome {
                    notification: Some(Notification::error(
                        "Failed to initiate subscription. Please try again.",
                    )),
                    effect: CheckoutEffect::None,
                }
            }
        },
        CheckoutStatus::Upgraded | CheckoutStatus::Updated => {
            let message = match &response.details {
                Some(details) if details.is_upgrade => format!(
                    "Subscription upgraded from ${} to ${}",
                    details.current_price, details.new_price
                ),
                _ => "Subscription updated successfully".to_string(),
            };
            CheckoutOutcome {
                notification: Some(Notification::success(message)),
                effect: CheckoutEffect::RefreshSubscription,
            }
        }
        CheckoutStatus::DowngradeScheduled | CheckoutStatus::Scheduled => {
            let effective = response
                .effective_date
                .and_then(|date| {
                    date.format(format_description!("[year]-[month]-[day]")).ok()
                })
                .unwrap_or_else(|| "the end of your billing period".to_string());
            CheckoutOutcome {
                notification: Some(
                    Notification::success("Subscription change scheduled")
                        .with_detail(format!("Your plan will change on {effective}.")),
                ),
                effect: CheckoutEffect::RefreshSubscription,
            }
        }
        CheckoutStatus::NoChange => CheckoutOutcome {
            notification: Some(Notification::info(
                response
                    .message
                    .clone()
                    .unwrap_or_else(|| "You are already on this plan.".to_string()),
            )),
            effect: CheckoutEffect::None,
        },
        CheckoutStatus::Unknown => {
            tracing::warn!("Unexpected checkout session status");
            CheckoutOutcome {
                notification: Some(Notification::error(
                    "An unexpected error occurred. Please try again.",
                )),
                effect: CheckoutEffect::None,
            }
        }
    }
}

/// Client for the checkout session endpoint.
#[derive(Debug, Clone)]
pub struct CheckoutClient {
    config: BillingConfig,
    http: reqwest::Client,
}

impl CheckoutClient {
    pub fn new(config: BillingConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }

    /// Create (or change) a checkout session for `price_id`. Success and
    /// cancel both return the viewer to the configured return URL.
    pub async fn create_session(
        &self,
        price_id: &str,
        access_token: Option<&str>,
    ) -> BillingResult<CheckoutSessionResponse> {
        let body = CreateCheckoutSession {
            price_id: price_id.to_string(),
            success_url: self.config.return_url.clone(),
            cancel_url: self.config.return_url.clone(),
        };

        let url = self.config.endpoint("/billing/create-checkout-session");
        let mut request = self.http.post(&url).json(&body);
        if let Some(token) = access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let detail = extract_error_detail(response).await;
            tracing::warn!(
                status = status.as_u16(),
                price_id = %price_id,
                "Checkout session request rejected"
            );
            return Err(BillingError::Api {
                status: status.as_u16(),
                detail,
            });
        }

        let session: CheckoutSessionResponse = response
            .json()
            .await
            .map_err(|e| BillingError::InvalidResponse(e.to_string()))?;

        tracing::info!(
            price_id = %price_id,
            status = ?session.status,
            "Checkout session response received"
        );

        Ok(session)
    }
}
