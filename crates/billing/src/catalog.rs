//! Pricing tier catalog
//!
//! The catalog is static configuration: a fixed list of tiers, one of
//! which ("Custom") carries nested usage-level upgrade plans. Prices are
//! display strings ("$20", "$0") because that is the contract the
//! billing backend and the rendering clients share; comparisons go
//! through [`price_cents`] which strips everything but digits and dots.

use serde::{Deserialize, Serialize};

/// Usage level pre-selected for the Custom tier until the viewer picks one.
pub const DEFAULT_SELECTED_PLAN: &str = "6 hours";

/// Plan aliases used by the billing backend.
pub const PLAN_FREE: &str = "free";
pub const PLAN_PRO: &str = "base";
pub const PLAN_ENTERPRISE: &str = "extra";

/// Style hint for a tier's action button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonColor {
    Default,
    Secondary,
    Ghost,
    Outline,
    Link,
}

/// One selectable usage level nested under the Custom tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradePlan {
    /// Usage level label, e.g. "12 hours". Doubles as the selection key.
    pub hours: String,
    /// Display price, e.g. "$95".
    pub price: String,
    /// External billing plan identifier.
    pub stripe_price_id: String,
}

/// A named subscription offering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTier {
    pub name: String,
    /// Display price, e.g. "$20". "$0" is the free-tier sentinel.
    pub price: String,
    pub description: String,
    pub features: Vec<String>,
    #[serde(default)]
    pub is_popular: bool,
    /// External billing plan identifier for the tier itself.
    pub stripe_price_id: String,
    pub button_color: ButtonColor,
    /// Included usage, e.g. "4 hours".
    pub hours: String,
    /// Usage-level sub-plans; only the Custom tier carries these.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgrade_plans: Option<Vec<UpgradePlan>>,
}

impl PricingTier {
    /// Whether this tier lets the viewer pick among usage levels.
    pub fn has_upgrade_plans(&self) -> bool {
        self.upgrade_plans.as_deref().is_some_and(|p| !p.is_empty())
    }

    /// Sub-plan matching a usage level label, if any.
    pub fn upgrade_plan(&self, hours: &str) -> Option<&UpgradePlan> {
        self.upgrade_plans
            .as_deref()
            .and_then(|plans| plans.iter().find(|p| p.hours == hours))
    }

    /// The price identifier the tier resolves to: the selected sub-plan's
    /// identifier when one applies, otherwise the tier's own.
    pub fn effective_price_id(&self, selected_hours: Option<&str>) -> &str {
        selected_hours
            .and_then(|hours| self.upgrade_plan(hours))
            .map(|p| p.stripe_price_id.as_str())
            .unwrap_or(&self.stripe_price_id)
    }

    /// The display price the tier resolves to under the same rule.
    pub fn effective_price(&self, selected_hours: Option<&str>) -> &str {
        selected_hours
            .and_then(|hours| self.upgrade_plan(hours))
            .map(|p| p.price.as_str())
            .unwrap_or(&self.price)
    }

    /// Usage label shown for the tier.
    pub fn displayed_hours<'a>(&'a self, selected_hours: Option<&'a str>) -> &'a str {
        if self.has_upgrade_plans() {
            if let Some(hours) = selected_hours {
                return hours;
            }
        }
        &self.hours
    }
}

/// The full tier catalog. Immutable at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierCatalog {
    pub tiers: Vec<PricingTier>,
}

impl TierCatalog {
    pub fn new(tiers: Vec<PricingTier>) -> Self {
        Self { tiers }
    }

    pub fn tier(&self, name: &str) -> Option<&PricingTier> {
        self.tiers.iter().find(|t| t.name == name)
    }

    /// Display price of the plan a subscription price identifier points
    /// at. Nested upgrade plans win over top-level tiers so a viewer on
    /// a usage level compares against that level's price, not the
    /// Custom tier's base price.
    pub fn active_plan_price(&self, price_id: &str) -> Option<&str> {
        let nested = self.tiers.iter().find_map(|tier| {
            tier.upgrade_plans.as_deref().and_then(|plans| {
                plans
                    .iter()
                    .find(|p| p.stripe_price_id == price_id)
                    .map(|p| p.price.as_str())
            })
        });
        nested.or_else(|| {
            self.tiers
                .iter()
                .find(|t| t.stripe_price_id == price_id)
                .map(|t| t.price.as_str())
        })
    }
}

impl Default for TierCatalog {
    /// The cloud catalog: Free, Pro, and the variable-usage Custom tier.
    fn default() -> Self {
        Self::new(vec![
            PricingTier {
                name: "Free".to_string(),
                price: "$0".to_string(),
                description: "Try the agent with a limited monthly allowance".to_string(),
                features: vec![
                    "1 hour of agent usage".to_string(),
                    "Public projects".to_string(),
                    "Community support".to_string(),
                ],
                is_popular: false,
                stripe_price_id: "price_free".to_string(),
                button_color: ButtonColor::Secondary,
                hours: "1 hour".to_string(),
                upgrade_plans: None,
            },
            PricingTier {
                name: "Pro".to_string(),
                price: "$20".to_string(),
                description: "For individuals running the agent every day".to_string(),
                features: vec![
                    "4 hours of agent usage".to_string(),
                    "Private projects".to_string(),
                    "Priority queue".to_string(),
                ],
                is_popular: true,
                stripe_price_id: "price_pro_monthly".to_string(),
                button_color: ButtonColor::Default,
                hours: "4 hours".to_string(),
                upgrade_plans: None,
            },
            PricingTier {
                name: "Custom".to_string(),
                price: "$50".to_string(),
                description: "Pick the monthly usage that fits your team".to_string(),
                features: vec![
                    "Everything in Pro".to_string(),
                    "Adjustable monthly usage".to_string(),
                    "Dedicated support".to_string(),
                ],
                is_popular: false,
                stripe_price_id: "price_custom_6h".to_string(),
                button_color: ButtonColor::Default,
                hours: "6 hours".to_string(),
                upgrade_plans: Some(vec![
                    UpgradePlan {
                        hours: "6 hours".to_string(),
                        price: "$50".to_string(),
                        stripe_price_id: "price_custom_6h".to_string(),
                    },
                    UpgradePlan {
                        hours: "12 hours".to_string(),
                        price: "$95".to_string(),
                        stripe_price_id: "price_custom_12h".to_string(),
                    },
                    UpgradePlan {
                        hours: "25 hours".to_string(),
                        price: "$190".to_string(),
                        stripe_price_id: "price_custom_25h".to_string(),
                    },
                    UpgradePlan {
                        hours: "50 hours".to_string(),
                        price: "$370".to_string(),
                        stripe_price_id: "price_custom_50h".to_string(),
                    },
                ]),
            },
        ])
    }
}

/// Parse a display price into integer cents.
///
/// Keeps digits and dots, parses the rest as decimal dollars. Malformed
/// or empty input is 0, matching the free-tier sentinel "$0". Locale and
/// currency symbols are knowingly ignored; the billing backend owns the
/// real amounts.
pub fn price_cents(display: &str) -> i64 {
    let numeric: String = display
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    numeric
        .parse::<f64>()
        .map(|dollars| (dollars * 100.0).round() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_cents_parses_plain_dollar_amounts() {
        assert_eq!(price_cents("$20"), 2_000);
        assert_eq!(price_cents("$1,250"), 125_000);
        assert_eq!(price_cents("$19.99"), 1_999);
    }

    #[test]
    fn price_cents_treats_free_sentinel_as_zero() {
        assert_eq!(price_cents("$0"), 0);
    }

    #[test]
    fn price_cents_falls_back_to_zero_on_malformed_input() {
        assert_eq!(price_cents(""), 0);
        assert_eq!(price_cents("Contact us"), 0);
        assert_eq!(price_cents("$1.2.3"), 0);
    }

    #[test]
    fn effective_price_id_prefers_selected_sub_plan() {
        let catalog = TierCatalog::default();
        let custom = catalog.tier("Custom").unwrap();

        assert_eq!(
            custom.effective_price_id(Some("12 hours")),
            "price_custom_12h"
        );
        // Unknown selection falls back to the tier's own identifier
        assert_eq!(
            custom.effective_price_id(Some("99 hours")),
            "price_custom_6h"
        );
        assert_eq!(custom.effective_price_id(None), "price_custom_6h");
    }

    #[test]
    fn active_plan_price_searches_nested_plans_first() {
        let catalog = TierCatalog::default();
        assert_eq!(catalog.active_plan_price("price_custom_25h"), Some("$190"));
        assert_eq!(catalog.active_plan_price("price_pro_monthly"), Some("$20"));
        assert_eq!(catalog.active_plan_price("price_unknown"), None);
    }
}
