//! HTTP routes
//!
//! The API is stateless: viewer identity rides on the bearer token,
//! usage-level selection rides on the request, and in-flight button
//! state stays in the rendering client. Checkout failures degrade to an
//! error notification in the response body, never to a 5xx.

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use agentfront_billing::{
    interpret, resolve_catalog, CheckoutEffect, CheckoutOutcome, LoadingFlags, Notification,
    SubscriptionStatus, TierView, UsageSelector, ViewerContext, SIGN_IN_URL,
};

use crate::error::ApiError;
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/pricing", get(pricing_view))
        .route("/v1/pricing/checkout", post(create_checkout))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
pub struct PricingQuery {
    /// Usage level the viewer has selected on the variable-usage tier.
    pub selected_hours: Option<String>,
}

/// Resolved pricing page for the viewer.
#[derive(Debug, Serialize)]
pub struct PricingView {
    pub authenticated: bool,
    pub subscription: Option<SubscriptionStatus>,
    /// The usage level the tiers were resolved against.
    pub selected_hours: String,
    pub tiers: Vec<TierView>,
}

/// GET /v1/pricing
///
/// A failed subscription fetch resolves the page for a signed-out
/// viewer instead of erroring; the page must render either way.
pub async fn pricing_view(
    State(state): State<AppState>,
    Query(query): Query<PricingQuery>,
    headers: HeaderMap,
) -> Result<Json<PricingView>, ApiError> {
    let token = bearer_token(&headers);

    let subscription = match state.subscriptions.fetch(token.as_deref()).await {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(error = %e, "Subscription fetch failed; resolving as signed out");
            None
        }
    };
    let authenticated = subscription.is_some();

    // Selection: an explicit query value must exist in the catalog; with
    // none given, the viewer's active sub-plan pre-selects.
    let mut selector = UsageSelector::new();
    if let Some(variable_tier) = state.catalog.tiers.iter().find(|t| t.has_upgrade_plans()) {
        selector.sync_from_subscription(variable_tier, subscription.as_ref());

        if let Some(hours) = &query.selected_hours {
            if variable_tier.upgrade_plan(hours).is_none() {
                return Err(ApiError::BadRequest(format!(
                    "Unknown usage level '{hours}'"
                )));
            }
            selector.select(hours);
        }
    }

    // In-flight state lives in the rendering client, not the server.
    let loading = LoadingFlags::new();
    let viewer = ViewerContext {
        authenticated,
        subscription: subscription.as_ref(),
        loading: &loading,
    };
    let tiers = resolve_catalog(&state.catalog, Some(selector.selected()), &viewer);

    Ok(Json(PricingView {
        authenticated,
        subscription,
        selected_hours: selector.selected().to_string(),
        tiers,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub price_id: String,
}

/// POST /v1/pricing/checkout
pub async fn create_checkout(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CheckoutRequest>,
) -> Json<CheckoutOutcome> {
    let Some(token) = bearer_token(&headers) else {
        return Json(CheckoutOutcome {
            notification: None,
            effect: CheckoutEffect::Redirect {
                url: SIGN_IN_URL.to_string(),
            },
        });
    };

    let outcome = match state
        .checkout
        .create_session(&request.price_id, Some(&token))
        .await
    {
        Ok(response) => interpret(&response),
        Err(e) => {
            tracing::error!(price_id = %request.price_id, error = %e, "Checkout session request failed");
            CheckoutOutcome {
                notification: Some(Notification::error(e.user_message())),
                effect: CheckoutEffect::None,
            }
        }
    };

    Json(outcome)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(String::from)
}
