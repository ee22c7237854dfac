//! Pricing page controller
//!
//! Event-driven state for one pricing view: the viewer's subscription,
//! the usage-level selection, and the per-price-id loading flags.
//!
//! Ordering contract: a price identifier's loading flag is set before
//! its checkout request is issued and cleared only after the request
//! settles, plus a short grace period so a refetch triggered by the
//! settle can land before the button re-enables.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::catalog::TierCatalog;
use crate::checkout::{interpret, CheckoutClient, CheckoutEffect, CheckoutOutcome};
use crate::config::BillingConfig;
use crate::notify::Notification;
use crate::resolver::{resolve_catalog, TierView, ViewerContext};
use crate::selector::UsageSelector;
use crate::subscription::{SubscriptionClient, SubscriptionStatus};

/// How long a settled price identifier stays marked loading.
pub const LOADING_CLEAR_GRACE: Duration = Duration::from_secs(1);

/// Where unauthenticated viewers are sent when they activate a tier.
pub const SIGN_IN_URL: &str = "/auth";

#[derive(Debug, Default)]
struct PageState {
    authenticated: bool,
    subscription: Option<SubscriptionStatus>,
    loading: HashMap<String, bool>,
    selector: UsageSelector,
}

/// Controller for the pricing view. Cheap to clone; all state is shared.
#[derive(Clone)]
pub struct PricingController {
    catalog: Arc<TierCatalog>,
    subscriptions: SubscriptionClient,
    checkout: CheckoutClient,
    state: Arc<Mutex<PageState>>,
    loading_grace: Duration,
}

impl PricingController {
    pub fn new(config: BillingConfig, catalog: TierCatalog) -> Self {
        let http = reqwest::Client::new();
        Self {
            catalog: Arc::new(catalog),
            subscriptions: SubscriptionClient::new(config.clone(), http.clone()),
            checkout: CheckoutClient::new(config, http),
            state: Arc::new(Mutex::new(PageState::default())),
            loading_grace: LOADING_CLEAR_GRACE,
        }
    }

    #[cfg(test)]
    fn with_grace(mut self, grace: Duration) -> Self {
        self.loading_grace = grace;
        self
    }

    pub fn catalog(&self) -> &TierCatalog {
        &self.catalog
    }

    /// Refetch the viewer's subscription. A fetch failure demotes the
    /// viewer to unauthenticated rather than surfacing an error; the
    /// page stays usable either way.
    pub async fn refresh_subscription(&self, access_token: Option<&str>) {
        let fetched = match self.subscriptions.fetch(access_token).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(error = %e, "Subscription fetch failed; treating viewer as signed out");
                None
            }
        };

        let mut state = self.state.lock().await;
        let state = &mut *state;
        state.authenticated = fetched.is_some();
        state.subscription = fetched;

        // Pre-select the viewer's usage level, at most once.
        if let Some(custom) = self.catalog.tiers.iter().find(|t| t.has_upgrade_plans()) {
            state
                .selector
                .sync_from_subscription(custom, state.subscription.as_ref());
        }
    }

    /// Resolve every tier for the current viewer state.
    pub async fn views(&self) -> Vec<TierView> {
        let state = self.state.lock().await;
        let viewer = ViewerContext {
            authenticated: state.authenticated,
            subscription: state.subscription.as_ref(),
            loading: &state.loading,
        };
        resolve_catalog(&self.catalog, Some(state.selector.selected()), &viewer)
    }

    /// Record a usage-level selection. Triggers a subscription refetch
    /// when the selection changed; never starts a checkout.
    pub async fn select_usage(&self, hours: &str, access_token: Option<&str>) {
        let changed = {
            let mut state = self.state.lock().await;
            state.selector.select(hours)
        };
        if changed {
            self.refresh_subscription(access_token).await;
        }
    }

    /// Activate a tier's action button: issue the checkout-session
    /// request for the tier's effective price identifier and interpret
    /// the response. Never returns an error; every failure degrades to
    /// a notification.
    pub async fn activate(&self, tier_name: &str, access_token: Option<&str>) -> CheckoutOutcome {
        // Resolve the price identifier and set its loading flag before
        // the request goes out, under one lock.
        let price_id = {
            let mut state = self.state.lock().await;

            if !state.authenticated {
                return CheckoutOutcome {
                    notification: None,
                    effect: CheckoutEffect::Redirect {
                        url: SIGN_IN_URL.to_string(),
                    },
                };
            }

            let Some(tier) = self.catalog.tier(tier_name) else {
                tracing::warn!(tier = %tier_name, "Activation for unknown tier");
                return CheckoutOutcome {
                    notification: Some(Notification::error(
                        "An unexpected error occurred. Please try again.",
                    )),
                    effect: CheckoutEffect::None,
                };
            };

            let selection = tier
                .has_upgrade_plans()
                .then(|| state.selector.selected().to_string());
            let price_id = tier.effective_price_id(selection.as_deref()).to_string();

            // A second activation while this identifier is in flight is
            // ignored. Other identifiers are not blocked.
            if state.loading.get(&price_id).copied().unwrap_or(false) {
                tracing::debug!(price_id = %price_id, "Activation ignored; request already in flight");
                return CheckoutOutcome {
                    notification: None,
                    effect: CheckoutEffect::None,
                };
            }
            state.loading.insert(price_id.clone(), true);
            price_id
        };

        let outcome = match self.checkout.create_session(&price_id, access_token).await {
            Ok(response) => {
                let outcome = interpret(&response);
                if outcome.effect == CheckoutEffect::RefreshSubscription {
                    self.refresh_subscription(access_token).await;
                }
                outcome
            }
            Err(e) => {
                tracing::error!(price_id = %price_id, error = %e, "Checkout session request failed");
                CheckoutOutcome {
                    notification: Some(Notification::error(e.user_message())),
                    effect: CheckoutEffect::None,
                }
            }
        };

        self.clear_loading_after_grace(price_id);
        outcome
    }

    /// Whether a request for `price_id` is still marked in flight.
    pub async fn is_loading(&self, price_id: &str) -> bool {
        let state = self.state.lock().await;
        state.loading.get(price_id).copied().unwrap_or(false)
    }

    fn clear_loading_after_grace(&self, price_id: String) {
        let state = Arc::clone(&self.state);
        let grace = self.loading_grace;
        tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            let mut state = state.lock().await;
            state.loading.remove(&price_id);
        });
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::checkout::CheckoutEffect;
    use crate::resolver::ButtonLabel;

    fn controller(server_url: String) -> PricingController {
        PricingController::new(
            BillingConfig::new(server_url, "https://app.example.com/pricing"),
            TierCatalog::default(),
        )
        .with_grace(Duration::from_millis(20))
    }

    async fn subscription_mock(server: &mut mockito::ServerGuard, body: &str) -> mockito::Mock {
        server
            .mock("GET", "/billing/subscription")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn fetch_failure_treats_viewer_as_signed_out() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/billing/subscription")
            .with_status(500)
            .create_async()
            .await;

        let controller = controller(server.url());
        controller.refresh_subscription(Some("token")).await;

        let views = controller.views().await;
        assert!(views
            .iter()
            .all(|v| v.button.label == ButtonLabel::TryFree && v.button.enabled));
    }

    #[tokio::test]
    async fn activation_while_signed_out_redirects_to_sign_in() {
        let server = mockito::Server::new_async().await;
        let controller = controller(server.url());

        let outcome = controller.activate("Pro", None).await;
        assert_eq!(
            outcome.effect,
            CheckoutEffect::Redirect {
                url: SIGN_IN_URL.to_string()
            }
        );
    }

    #[tokio::test]
    async fn activation_marks_loading_then_clears_after_grace() {
        let mut server = mockito::Server::new_async().await;
        let _sub = subscription_mock(
            &mut server,
            r#"{"price_id":"price_free","status":"active"}"#,
        )
        .await;
        let _checkout = server
            .mock("POST", "/billing/create-checkout-session")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"checkout_created","url":"https://checkout.example.com/cs_1"}"#)
            .create_async()
            .await;

        let controller = controller(server.url());
        controller.refresh_subscription(Some("token")).await;

        let outcome = controller.activate("Pro", Some("token")).await;
        assert_eq!(
            outcome.effect,
            CheckoutEffect::Redirect {
                url: "https://checkout.example.com/cs_1".to_string()
            }
        );

        // Still marked loading during the grace period...
        assert!(controller.is_loading("price_pro_monthly").await);
        // ...and cleared once it elapses.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!controller.is_loading("price_pro_monthly").await);
    }

    #[tokio::test]
    async fn second_activation_for_same_price_is_ignored() {
        let mut server = mockito::Server::new_async().await;
        let _sub = subscription_mock(
            &mut server,
            r#"{"price_id":"price_free","status":"active"}"#,
        )
        .await;
        let checkout = server
            .mock("POST", "/billing/create-checkout-session")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"checkout_created","url":"https://checkout.example.com/cs_1"}"#)
            .expect(1)
            .create_async()
            .await;

        let controller = controller(server.url());
        controller.refresh_subscription(Some("token")).await;

        let first = controller.activate("Pro", Some("token")).await;
        assert!(matches!(first.effect, CheckoutEffect::Redirect { .. }));

        // The flag is still set (grace period), so this click is a no-op.
        let second = controller.activate("Pro", Some("token")).await;
        assert_eq!(second.effect, CheckoutEffect::None);
        assert!(second.notification.is_none());

        checkout.assert_async().await;
    }

    #[tokio::test]
    async fn rejected_checkout_surfaces_detail_and_clears_loading() {
        let mut server = mockito::Server::new_async().await;
        let _sub = subscription_mock(
            &mut server,
            r#"{"price_id":"price_free","status":"active"}"#,
        )
        .await;
        let _checkout = server
            .mock("POST", "/billing/create-checkout-session")
            .with_status(402)
            .with_body(r#"{"detail":"Payment method required"}"#)
            .create_async()
            .await;

        let controller = controller(server.url());
        controller.refresh_subscription(Some("token")).await;

        let outcome = controller.activate("Pro", Some("token")).await;
        assert_eq!(outcome.effect, CheckoutEffect::None);
        assert_eq!(
            outcome.notification.unwrap().message,
            "Payment method required"
        );

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!controller.is_loading("price_pro_monthly").await);
    }

    #[tokio::test]
    async fn checkout_settle_refreshes_subscription() {
        let mut server = mockito::Server::new_async().await;
        // First fetch: free plan. Second fetch (after the upgrade): Pro.
        let _sub_first = server
            .mock("GET", "/billing/subscription")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"price_id":"price_free","status":"active"}"#)
            .expect(1)
            .create_async()
            .await;
        let _checkout = server
            .mock("POST", "/billing/create-checkout-session")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"upgraded","details":{"is_upgrade":true,"current_price":0,"new_price":20}}"#)
            .create_async()
            .await;

        let controller = controller(server.url());
        controller.refresh_subscription(Some("token")).await;

        let _sub_second = server
            .mock("GET", "/billing/subscription")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"price_id":"price_pro_monthly","status":"active"}"#)
            .create_async()
            .await;

        let outcome = controller.activate("Pro", Some("token")).await;
        assert_eq!(outcome.effect, CheckoutEffect::RefreshSubscription);
        assert_eq!(
            outcome.notification.unwrap().message,
            "Subscription upgraded from $0 to $20"
        );

        // Once the grace elapses the Pro tier resolves as current.
        tokio::time::sleep(Duration::from_millis(100)).await;
        let views = controller.views().await;
        let pro = views.iter().find(|v| v.name == "Pro").unwrap();
        assert_eq!(pro.button.label, ButtonLabel::CurrentPlan);
    }

    #[tokio::test]
    async fn selecting_a_usage_level_never_starts_checkout() {
        let mut server = mockito::Server::new_async().await;
        let _sub = subscription_mock(
            &mut server,
            r#"{"price_id":"price_custom_6h","status":"active"}"#,
        )
        .await;
        let checkout = server
            .mock("POST", "/billing/create-checkout-session")
            .expect(0)
            .create_async()
            .await;

        let controller = controller(server.url());
        controller.refresh_subscription(Some("token")).await;
        controller.select_usage("25 hours", Some("token")).await;

        let views = controller.views().await;
        let custom = views.iter().find(|v| v.name == "Custom").unwrap();
        assert_eq!(custom.price_id, "price_custom_25h");
        assert_eq!(custom.button.label, ButtonLabel::Upgrade);

        checkout.assert_async().await;
    }
}
