//! Read-only plan catalog

use al_shared::config::{PlanCatalogConfig, PlanLimitConfig};

use crate::domain::entities::{ListingLimit, PlanDetails, PlanKey};

/// Resolves a plan key to the entitlements it grants
pub trait PlanCatalog: Send + Sync {
    /// Unknown plan keys resolve to the free tier
    fn plan_details(&self, plan: &PlanKey) -> PlanDetails;
}

/// Catalog backed by configuration, fixed for the lifetime of the process
#[derive(Debug, Clone)]
pub struct StaticPlanCatalog {
    config: PlanCatalogConfig,
}

impl StaticPlanCatalog {
    pub fn from_config(config: PlanCatalogConfig) -> Self {
        Self {
            config: config.with_builtin_fallback(),
        }
    }

    fn to_details(plan: &PlanLimitConfig) -> PlanDetails {
        PlanDetails {
            name: plan.name.clone(),
            listing_limit: match plan.listing_limit.count() {
                Some(limit) => ListingLimit::Limited(limit),
                None => ListingLimit::Unlimited,
            },
            free_certifications: plan.free_certifications,
            feature_credit_limit: plan.feature_credit_limit,
        }
    }
}

impl Default for StaticPlanCatalog {
    fn default() -> Self {
        Self::from_config(PlanCatalogConfig::default())
    }
}

impl PlanCatalog for StaticPlanCatalog {
    fn plan_details(&self, plan: &PlanKey) -> PlanDetails {
        match self
            .config
            .get(plan.as_str())
            .or_else(|| self.config.get(PlanKey::Free.as_str()))
        {
            Some(limits) => Self::to_details(limits),
            None => PlanDetails {
                name: "Free".to_string(),
                listing_limit: ListingLimit::Limited(1),
                free_certifications: 0,
                feature_credit_limit: 0,
            },
        }
    }
}
