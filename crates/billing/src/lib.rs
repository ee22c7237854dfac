// Billing crate clippy configuration
// Test code patterns (expected in test files):
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! agentfront billing module
//!
//! Front-of-house billing logic: everything the pricing view needs,
//! backed by the billing collaborator over HTTP.
//!
//! ## Features
//!
//! - **Tier Catalog**: static tier configuration with nested usage
//!   levels and lenient display-price parsing
//! - **Subscription Status**: read-only fetch of the viewer's plan
//! - **Tier Action Resolver**: ordered-rule derivation of per-tier
//!   button state (label, enabled, variant, badge)
//! - **Usage-Level Selector**: one-shot pre-selection, checkout-free
//!   switching
//! - **Checkout Sessions**: create/change requests and response
//!   interpretation into notifications and effects
//! - **Tool-Call Display**: primary-parameter extraction and icon
//!   classification for agent tool calls

pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod notify;
pub mod page;
pub mod resolver;
pub mod selector;
pub mod subscription;
pub mod toolcall;


// Catalog
pub use catalog::{
    price_cents, ButtonColor, PricingTier, TierCatalog, UpgradePlan, DEFAULT_SELECTED_PLAN,
};

// Checkout
pub use checkout::{
    interpret, CheckoutClient, CheckoutEffect, CheckoutOutcome, CheckoutSessionResponse,
    CheckoutStatus, CreateCheckoutSession, UpgradeDetails,
};

// Config
pub use config::BillingConfig;

// Error
pub use error::{BillingError, BillingResult};

// Notifications
pub use notify::{Notification, NotificationLevel};

// Page controller
pub use page::{PricingController, LOADING_CLEAR_GRACE, SIGN_IN_URL};

// Resolver
pub use resolver::{
    resolve_button, resolve_catalog, resolve_tier_view, ButtonLabel, ButtonState, LoadingFlags,
    StatusBadge, TierView, ViewerContext,
};

// Selector
pub use selector::UsageSelector;

// Subscription
pub use subscription::{SubscriptionClient, SubscriptionState, SubscriptionStatus};

// Tool calls
pub use toolcall::{
    extract_primary_param, extract_primary_param_from_json, icon_for_tool, safe_json_parse,
    ToolIcon,
};
