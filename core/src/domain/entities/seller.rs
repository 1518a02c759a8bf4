//! Seller entity: the subscription state the entitlement engine reads.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Subscription plan key
///
/// The three built-in tiers are matched by name; any other key is carried
/// through as a custom tier and resolved against the plan catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PlanKey {
    Free,
    Pro,
    Premium,
    Custom(String),
}

impl PlanKey {
    pub fn as_str(&self) -> &str {
        match self {
            PlanKey::Free => "free",
            PlanKey::Pro => "pro",
            PlanKey::Premium => "premium",
            PlanKey::Custom(key) => key.as_str(),
        }
    }

    pub fn is_premium(&self) -> bool {
        matches!(self, PlanKey::Premium)
    }
}

impl From<String> for PlanKey {
    fn from(value: String) -> Self {
        let key = value.trim().to_lowercase();
        match key.as_str() {
            "" | "free" => PlanKey::Free,
            "pro" => PlanKey::Pro,
            "premium" => PlanKey::Premium,
            _ => PlanKey::Custom(key),
        }
    }
}

impl From<&str> for PlanKey {
    fn from(value: &str) -> Self {
        PlanKey::from(value.to_string())
    }
}

impl From<PlanKey> for String {
    fn from(value: PlanKey) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for PlanKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Seller entity (the subset relevant to listing entitlements)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seller {
    /// Unique key, stored normalized (trimmed, lowercase)
    pub email: String,

    /// Current subscription plan
    pub subscription_plan: PlanKey,

    /// Raw plan expiry as stored; absent means the plan never lapses by date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_expiry_date: Option<String>,

    /// Remaining featured credits; `None` until the first credit is spent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_credits: Option<u32>,

    /// Certification requests consumed so far
    #[serde(default)]
    pub used_certifications: u32,

    /// Optimistic concurrency version, bumped on every write
    #[serde(default)]
    pub version: u64,

    /// Timestamp when the seller was last updated
    pub updated_at: DateTime<Utc>,
}

impl Seller {
    /// Creates a seller on the given plan with no expiry and untouched quotas
    pub fn new(email: impl Into<String>, plan: PlanKey) -> Self {
        Self {
            email: al_shared::validation::normalize_email(&email.into()),
            subscription_plan: plan,
            plan_expiry_date: None,
            featured_credits: None,
            used_certifications: 0,
            version: 0,
            updated_at: Utc::now(),
        }
    }

    /// Sets the plan expiry to the given instant
    pub fn with_plan_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.plan_expiry_date = Some(expires_at.to_rfc3339());
        self
    }

    /// Sets the raw plan expiry string, as a store would hand it back
    pub fn with_raw_plan_expiry(mut self, raw: impl Into<String>) -> Self {
        self.plan_expiry_date = Some(raw.into());
        self
    }

    /// Whether a plan expiry value is present at all (parseable or not)
    pub fn has_plan_expiry_date(&self) -> bool {
        self.plan_expiry_date
            .as_deref()
            .map(|raw| !raw.trim().is_empty())
            .unwrap_or(false)
    }

    /// The plan expiry as an instant.
    ///
    /// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (midnight UTC).
    /// Returns `None` when absent or unparseable.
    pub fn plan_expires_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.plan_expiry_date.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    /// Premium without a plan expiry: listings never expire
    pub fn is_premium_lifetime(&self) -> bool {
        self.subscription_plan.is_premium() && !self.has_plan_expiry_date()
    }
}

/// Partial update applied to a seller record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SellerPatch {
    pub subscription_plan: Option<PlanKey>,
    pub plan_expiry_date: Option<Option<String>>,
    pub featured_credits: Option<Option<u32>>,
    pub used_certifications: Option<u32>,
}

impl SellerPatch {
    pub fn is_empty(&self) -> bool {
        self == &SellerPatch::default()
    }

    /// Applies the patch and bumps the version
    pub fn apply_to(&self, seller: &mut Seller, now: DateTime<Utc>) {
        if let Some(plan) = &self.subscription_plan {
            seller.subscription_plan = plan.clone();
        }
        if let Some(expiry) = &self.plan_expiry_date {
            seller.plan_expiry_date = expiry.clone();
        }
        if let Some(credits) = self.featured_credits {
            seller.featured_credits = credits;
        }
        if let Some(used) = self.used_certifications {
            seller.used_certifications = used;
        }
        seller.version += 1;
        seller.updated_at = now;
    }
}
