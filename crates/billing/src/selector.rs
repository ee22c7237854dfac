//! Usage-level selection for the variable-usage tier
//!
//! Selecting a level only changes local state (and asks the caller to
//! refetch the subscription so button states re-derive against the new
//! comparison target); it never starts a checkout.

use crate::catalog::{PricingTier, DEFAULT_SELECTED_PLAN};
use crate::subscription::SubscriptionStatus;

/// Local selection state for one tier with upgrade plans.
#[derive(Debug, Clone)]
pub struct UsageSelector {
    selected: String,
    /// One-shot guard: the subscription may pre-select a level exactly
    /// once, after which only the viewer changes it.
    initialized: bool,
}

impl Default for UsageSelector {
    fn default() -> Self {
        Self {
            selected: DEFAULT_SELECTED_PLAN.to_string(),
            initialized: false,
        }
    }
}

impl UsageSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> &str {
        &self.selected
    }

    /// Pre-select the level matching the viewer's active plan. Runs its
    /// logic at most once; later calls are no-ops so an explicit viewer
    /// selection is never overridden by a refetch.
    pub fn sync_from_subscription(
        &mut self,
        tier: &PricingTier,
        subscription: Option<&SubscriptionStatus>,
    ) {
        if self.initialized {
            return;
        }

        let Some(plans) = tier.upgrade_plans.as_deref() else {
            return;
        };
        let Some(price_id) = subscription.and_then(|s| s.price_id.as_deref()) else {
            return;
        };

        if let Some(matching) = plans.iter().find(|p| p.stripe_price_id == price_id) {
            self.selected = matching.hours.clone();
        }
        self.initialized = true;
    }

    /// Record the viewer's choice. Returns true when the selection
    /// changed and the caller should refetch the subscription.
    pub fn select(&mut self, hours: &str) -> bool {
        self.initialized = true;
        if self.selected == hours {
            return false;
        }
        self.selected = hours.to_string();
        true
    }
}
