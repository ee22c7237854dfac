//! Tier action resolver
//!
//! Derives, per tier, the displayed price and the action button state
//! (label, enabled, variant, badge) from the tier definition, the
//! viewer's subscription, and the per-price-id loading flags.
//!
//! The derivation is an ordered rule list evaluated top to bottom; the
//! first matching rule wins. Ordering is the contract: a plan that is
//! both "current" and part of a pending schedule resolves by whichever
//! rule comes first, never by an accidental interaction of independent
//! checks.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{price_cents, ButtonColor, PricingTier, TierCatalog};
use crate::subscription::SubscriptionStatus;

/// Per-price-id in-flight request flags.
pub type LoadingFlags = HashMap<String, bool>;

/// Action button label. `Unavailable` renders as "-": a downgrade the
/// viewer cannot take from this page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonLabel {
    TryFree,
    Loading,
    CurrentPlan,
    Scheduled,
    ChangeScheduled,
    Upgrade,
    SelectPlan,
    Unavailable,
}

impl ButtonLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ButtonLabel::TryFree => "Try Free",
            ButtonLabel::Loading => "Loading...",
            ButtonLabel::CurrentPlan => "Current Plan",
            ButtonLabel::Scheduled => "Scheduled",
            ButtonLabel::ChangeScheduled => "Change Scheduled",
            ButtonLabel::Upgrade => "Upgrade",
            ButtonLabel::SelectPlan => "Select Plan",
            ButtonLabel::Unavailable => "-",
        }
    }
}

/// Status badge shown next to the tier name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusBadge {
    Current,
    Scheduled,
    DowngradePending,
}

impl StatusBadge {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusBadge::Current => "Current",
            StatusBadge::Scheduled => "Scheduled",
            StatusBadge::DowngradePending => "Downgrade Pending",
        }
    }
}

/// Resolved state of a tier's action button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonState {
    pub label: ButtonLabel,
    pub enabled: bool,
    pub variant: ButtonColor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<StatusBadge>,
}

/// Everything the resolver needs to know about the viewer.
#[derive(Debug, Clone, Copy)]
pub struct ViewerContext<'a> {
    pub authenticated: bool,
    /// None when the viewer has never subscribed or is signed out.
    pub subscription: Option<&'a SubscriptionStatus>,
    pub loading: &'a LoadingFlags,
}

impl<'a> ViewerContext<'a> {
    fn is_loading(&self, price_id: &str) -> bool {
        self.loading.get(price_id).copied().unwrap_or(false)
    }
}

/// Fully resolved tier, ready for a rendering client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierView {
    pub name: String,
    pub display_price: String,
    pub displayed_hours: String,
    /// The price identifier the action button would submit.
    pub price_id: String,
    pub is_popular: bool,
    pub features: Vec<String>,
    pub button: ButtonState,
}

/// Resolve a tier's button state. Rules in precedence order, first
/// match wins:
///
/// 1. not authenticated      -> Try Free, enabled
/// 2. request in flight      -> Loading..., disabled
/// 3. current plan           -> Current Plan, disabled, Current badge
/// 4. scheduled target       -> Scheduled, disabled, Scheduled badge
/// 5. downgrading-from plan  -> Change Scheduled, enabled, Downgrade Pending badge
/// 6. price comparison       -> Upgrade / - / Select Plan
pub fn resolve_button(
    tier: &PricingTier,
    selected_hours: Option<&str>,
    catalog: &TierCatalog,
    viewer: &ViewerContext<'_>,
) -> ButtonState {
    let effective_id = tier.effective_price_id(selected_hours);

    // Rule 1: signed-out viewers always get the call to action.
    if !viewer.authenticated {
        return ButtonState {
            label: ButtonLabel::TryFree,
            enabled: true,
            variant: tier.button_color,
            badge: None,
        };
    }

    // Rule 2: a request for this price identifier is already in flight.
    if viewer.is_loading(effective_id) {
        return ButtonState {
            label: ButtonLabel::Loading,
            enabled: false,
            variant: ButtonColor::Secondary,
            badge: None,
        };
    }

    let subscription = viewer.subscription;

    // Rule 3: this is the viewer's active plan.
    if subscription.is_some_and(|s| s.is_active_plan(effective_id)) {
        return ButtonState {
            label: ButtonLabel::CurrentPlan,
            enabled: false,
            variant: ButtonColor::Secondary,
            badge: Some(StatusBadge::Current),
        };
    }

    // Rule 4: a pending change already targets this plan.
    if subscription.is_some_and(|s| s.is_scheduled_plan(effective_id)) {
        return ButtonState {
            label: ButtonLabel::Scheduled,
            enabled: false,
            variant: ButtonColor::Outline,
            badge: Some(StatusBadge::Scheduled),
        };
    }

    // Rule 5: the tier itself is the plan a pending change moves away
    // from, but the viewer's selection points elsewhere (rule 3 did not
    // match). The button stays actionable so the change can be revised.
    if subscription
        .is_some_and(|s| s.has_schedule && s.is_active_plan(&tier.stripe_price_id))
    {
        return ButtonState {
            label: ButtonLabel::ChangeScheduled,
            enabled: true,
            variant: ButtonColor::Secondary,
            badge: Some(StatusBadge::DowngradePending),
        };
    }

    // Rule 6: compare prices. A viewer without a resolvable active plan
    // compares against the free sentinel.
    let current_price = subscription
        .and_then(|s| s.price_id.as_deref())
        .and_then(|id| catalog.active_plan_price(id))
        .unwrap_or("$0");

    let current_cents = price_cents(current_price);
    let target_cents = price_cents(tier.effective_price(selected_hours));

    if target_cents > current_cents {
        ButtonState {
            label: ButtonLabel::Upgrade,
            enabled: true,
            variant: tier.button_color,
            badge: None,
        }
    } else if target_cents < current_cents {
        ButtonState {
            label: ButtonLabel::Unavailable,
            enabled: false,
            variant: ButtonColor::Secondary,
            badge: None,
        }
    } else {
        ButtonState {
            label: ButtonLabel::SelectPlan,
            enabled: true,
            variant: tier.button_color,
            badge: None,
        }
    }
}

/// Resolve the full view for one tier.
pub fn resolve_tier_view(
    tier: &PricingTier,
    selected_hours: Option<&str>,
    catalog: &TierCatalog,
    viewer: &ViewerContext<'_>,
) -> TierView {
    TierView {
        name: tier.name.clone(),
        display_price: tier.effective_price(selected_hours).to_string(),
        displayed_hours: tier.displayed_hours(selected_hours).to_string(),
        price_id: tier.effective_price_id(selected_hours).to_string(),
        is_popular: tier.is_popular,
        features: tier.features.clone(),
        button: resolve_button(tier, selected_hours, catalog, viewer),
    }
}

/// Resolve the whole catalog for the viewer. `selected_hours` applies
/// to tiers with upgrade plans only.
pub fn resolve_catalog(
    catalog: &TierCatalog,
    selected_hours: Option<&str>,
    viewer: &ViewerContext<'_>,
) -> Vec<TierView> {
    catalog
        .tiers
        .iter()
        .map(|tier| {
            let selection = if tier.has_upgrade_plans() {
                selected_hours
            } else {
                None
            };
            resolve_tier_view(tier, selection, catalog, viewer)
        })
        .collect()
}
