//! Subscription plan catalog configuration
//!
//! The catalog is read-only at runtime. Operators may add custom plan keys
//! next to the built-in `free`, `pro` and `premium` tiers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Listing cap as written in configuration: an integer or `"unlimited"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ListingLimitConfig {
    Count(u32),
    Keyword(UnlimitedKeyword),
}

/// The `"unlimited"` keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnlimitedKeyword {
    Unlimited,
}

impl ListingLimitConfig {
    pub const UNLIMITED: Self = ListingLimitConfig::Keyword(UnlimitedKeyword::Unlimited);

    /// The numeric cap, or `None` when unlimited
    pub fn count(&self) -> Option<u32> {
        match self {
            ListingLimitConfig::Count(n) => Some(*n),
            ListingLimitConfig::Keyword(UnlimitedKeyword::Unlimited) => None,
        }
    }
}

/// Limits granted by a single plan
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PlanLimitConfig {
    /// Display name of the plan
    pub name: String,

    /// Maximum simultaneously published listings
    pub listing_limit: ListingLimitConfig,

    /// Certification requests included with the plan
    #[serde(default)]
    pub free_certifications: u32,

    /// Featured-listing credits included with the plan
    #[serde(default)]
    pub feature_credit_limit: u32,
}

impl PlanLimitConfig {
    pub fn new(
        name: impl Into<String>,
        listing_limit: ListingLimitConfig,
        free_certifications: u32,
        feature_credit_limit: u32,
    ) -> Self {
        Self {
            name: name.into(),
            listing_limit,
            free_certifications,
            feature_credit_limit,
        }
    }
}

/// Plan catalog keyed by plan key (`free`, `pro`, `premium`, or custom)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlanCatalogConfig {
    #[serde(default = "builtin_plans")]
    pub plans: HashMap<String, PlanLimitConfig>,
}

impl Default for PlanCatalogConfig {
    fn default() -> Self {
        Self {
            plans: builtin_plans(),
        }
    }
}

impl PlanCatalogConfig {
    /// Fill in any built-in tier the configuration left out
    pub fn with_builtin_fallback(mut self) -> Self {
        for (key, plan) in builtin_plans() {
            self.plans.entry(key).or_insert(plan);
        }
        self
    }

    /// Add or replace a plan
    pub fn with_plan(mut self, key: impl Into<String>, plan: PlanLimitConfig) -> Self {
        self.plans.insert(key.into().to_lowercase(), plan);
        self
    }

    pub fn get(&self, key: &str) -> Option<&PlanLimitConfig> {
        self.plans.get(key)
    }
}

fn builtin_plans() -> HashMap<String, PlanLimitConfig> {
    HashMap::from([
        (
            "free".to_string(),
            PlanLimitConfig::new("Free", ListingLimitConfig::Count(1), 0, 0),
        ),
        (
            "pro".to_string(),
            PlanLimitConfig::new("Pro", ListingLimitConfig::Count(10), 2, 2),
        ),
        (
            "premium".to_string(),
            PlanLimitConfig::new("Premium", ListingLimitConfig::UNLIMITED, 5, 5),
        ),
    ])
}
