//! Plan details resolved from the plan catalog.

use serde::{Deserialize, Serialize};

/// Maximum number of simultaneously published listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingLimit {
    Limited(u32),
    Unlimited,
}

impl ListingLimit {
    /// Whether `published` listings already fill the cap
    pub fn is_reached(&self, published: usize) -> bool {
        match self {
            ListingLimit::Limited(limit) => published >= *limit as usize,
            ListingLimit::Unlimited => false,
        }
    }
}

impl std::fmt::Display for ListingLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListingLimit::Limited(limit) => write!(f, "{}", limit),
            ListingLimit::Unlimited => f.write_str("unlimited"),
        }
    }
}

/// Entitlements granted by a plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDetails {
    pub name: String,
    pub listing_limit: ListingLimit,
    pub free_certifications: u32,
    pub feature_credit_limit: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_limit_reached() {
        assert!(ListingLimit::Limited(1).is_reached(1));
        assert!(!ListingLimit::Limited(2).is_reached(1));
        assert!(ListingLimit::Limited(0).is_reached(0));
        assert!(!ListingLimit::Unlimited.is_reached(10_000));
        assert_eq!(ListingLimit::Unlimited.to_string(), "unlimited");
    }
}
