//! Vehicle entity representing a classified listing.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::value_objects::ListingState;

/// Boost duration when the package id carries no numeric suffix
pub const DEFAULT_BOOST_DAYS: i64 = 7;

/// Longest boost a package id may request
pub const MAX_BOOST_DAYS: i64 = 365;

/// Coarse publication status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    Published,
    Unpublished,
    Sold,
}

impl VehicleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Published => "published",
            VehicleStatus::Unpublished => "unpublished",
            VehicleStatus::Sold => "sold",
        }
    }
}

impl std::str::FromStr for VehicleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "published" => Ok(VehicleStatus::Published),
            "unpublished" => Ok(VehicleStatus::Unpublished),
            "sold" => Ok(VehicleStatus::Sold),
            other => Err(format!("Unknown vehicle status: {}", other)),
        }
    }
}

/// Reason code layered on top of [`VehicleStatus`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Active,
    Expired,
    Suspended,
    Sold,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Active => "active",
            ListingStatus::Expired => "expired",
            ListingStatus::Suspended => "suspended",
            ListingStatus::Sold => "sold",
        }
    }
}

impl std::str::FromStr for ListingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ListingStatus::Active),
            "expired" => Ok(ListingStatus::Expired),
            "suspended" => Ok(ListingStatus::Suspended),
            "sold" => Ok(ListingStatus::Sold),
            other => Err(format!("Unknown listing status: {}", other)),
        }
    }
}

/// Third-party certification request state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CertificationStatus {
    #[default]
    None,
    Requested,
}

impl CertificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CertificationStatus::None => "none",
            CertificationStatus::Requested => "requested",
        }
    }
}

impl std::str::FromStr for CertificationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" | "" => Ok(CertificationStatus::None),
            "requested" => Ok(CertificationStatus::Requested),
            other => Err(format!("Unknown certification status: {}", other)),
        }
    }
}

/// Boost package id split into its type and duration.
///
/// Package ids look like `<type>_<durationDays>`, e.g. `top_search_14`.
/// Without a positive numeric suffix the whole id is the type and the
/// duration is [`DEFAULT_BOOST_DAYS`]. A suffix above [`MAX_BOOST_DAYS`]
/// makes the id invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoostPackage {
    pub package_id: String,
    pub boost_type: String,
    pub duration_days: i64,
}

impl BoostPackage {
    pub fn parse(package_id: &str) -> Option<Self> {
        let package_id = package_id.trim();
        if package_id.is_empty() {
            return None;
        }

        let (boost_type, duration_days) = match package_id.rsplit_once('_') {
            Some((prefix, suffix)) if !prefix.is_empty() => match suffix.parse::<i64>() {
                Ok(days) if days > MAX_BOOST_DAYS => return None,
                Ok(days) if days > 0 => (prefix.to_string(), days),
                Err(_) if suffix.bytes().all(|b| b.is_ascii_digit()) && !suffix.is_empty() => {
                    return None
                }
                _ => (package_id.to_string(), DEFAULT_BOOST_DAYS),
            },
            _ => (package_id.to_string(), DEFAULT_BOOST_DAYS),
        };

        Some(Self {
            package_id: package_id.to_string(),
            boost_type,
            duration_days,
        })
    }
}

/// A promotional placement attached to a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Boost {
    pub id: Uuid,
    pub package_id: String,
    #[serde(rename = "type")]
    pub boost_type: String,
    pub start_date: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
}

impl Boost {
    pub fn start(package: &BoostPackage, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            package_id: package.package_id.clone(),
            boost_type: package.boost_type.clone(),
            start_date: now,
            expires_at: now + Duration::days(package.duration_days),
            is_active: true,
        }
    }
}

/// Seller-supplied listing payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ListingDraft {
    #[validate(length(min = 1, max = 64))]
    pub make: String,

    #[validate(length(min = 1, max = 64))]
    pub model: String,

    #[validate(range(min = 1886, max = 2100))]
    pub year: i32,

    /// Asking price in the smallest currency unit
    #[validate(range(min = 1))]
    pub price: u64,

    #[serde(default)]
    pub mileage: Option<u32>,

    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: Option<String>,
}

/// Vehicle listing entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: Uuid,
    pub seller_email: String,

    pub make: String,
    pub model: String,
    pub year: i32,
    pub price: u64,
    pub mileage: Option<u32>,
    pub description: Option<String>,

    pub status: VehicleStatus,
    pub listing_status: ListingStatus,
    /// Absent means the listing does not expire
    pub listing_expires_at: Option<DateTime<Utc>>,

    pub is_featured: bool,
    pub featured_at: Option<DateTime<Utc>>,

    pub certification_status: CertificationStatus,
    pub certification_requested_at: Option<DateTime<Utc>>,

    /// Boosts in the order they were purchased
    #[serde(default)]
    pub active_boosts: Vec<Boost>,

    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub inquiries_count: u64,

    pub sold_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    /// Creates a published, active listing from a validated draft
    pub fn publish(
        draft: ListingDraft,
        seller_email: impl Into<String>,
        listing_expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            seller_email: seller_email.into(),
            make: draft.make,
            model: draft.model,
            year: draft.year,
            price: draft.price,
            mileage: draft.mileage,
            description: draft.description,
            status: VehicleStatus::Published,
            listing_status: ListingStatus::Active,
            listing_expires_at,
            is_featured: false,
            featured_at: None,
            certification_status: CertificationStatus::None,
            certification_requested_at: None,
            active_boosts: Vec::new(),
            views: 0,
            inquiries_count: 0,
            sold_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_published(&self) -> bool {
        self.status == VehicleStatus::Published
    }

    pub fn is_sold(&self) -> bool {
        self.status == VehicleStatus::Sold
    }

    /// Suspended by the listing cap and not yet past its expiry
    pub fn is_reinstatable(&self, now: DateTime<Utc>) -> bool {
        self.status == VehicleStatus::Unpublished
            && self.listing_status == ListingStatus::Suspended
            && self.listing_expires_at.map_or(true, |at| at > now)
    }

    /// The reconciled fields of this vehicle
    pub fn listing_state(&self) -> ListingState {
        ListingState {
            status: self.status,
            listing_status: self.listing_status,
            listing_expires_at: self.listing_expires_at,
        }
    }

    pub fn set_listing_state(&mut self, state: &ListingState) {
        self.status = state.status;
        self.listing_status = state.listing_status;
        self.listing_expires_at = state.listing_expires_at;
    }
}

/// Partial update applied to a vehicle record.
///
/// `Option<Option<T>>` fields distinguish "leave untouched" (`None`) from
/// "clear" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VehiclePatch {
    pub status: Option<VehicleStatus>,
    pub listing_status: Option<ListingStatus>,
    pub listing_expires_at: Option<Option<DateTime<Utc>>>,
    pub is_featured: Option<bool>,
    pub featured_at: Option<Option<DateTime<Utc>>>,
    pub certification_status: Option<CertificationStatus>,
    pub certification_requested_at: Option<Option<DateTime<Utc>>>,
    /// Appended to `active_boosts`
    pub push_boost: Option<Boost>,
    pub views: Option<u64>,
    pub inquiries_count: Option<u64>,
    pub sold_at: Option<Option<DateTime<Utc>>>,
}

impl VehiclePatch {
    /// Patch writing exactly the reconciled fields
    pub fn from_state(state: &ListingState) -> Self {
        Self {
            status: Some(state.status),
            listing_status: Some(state.listing_status),
            listing_expires_at: Some(state.listing_expires_at),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &VehiclePatch::default()
    }

    pub fn apply_to(&self, vehicle: &mut Vehicle, now: DateTime<Utc>) {
        if let Some(status) = self.status {
            vehicle.status = status;
        }
        if let Some(listing_status) = self.listing_status {
            vehicle.listing_status = listing_status;
        }
        if let Some(expires_at) = self.listing_expires_at {
            vehicle.listing_expires_at = expires_at;
        }
        if let Some(is_featured) = self.is_featured {
            vehicle.is_featured = is_featured;
        }
        if let Some(featured_at) = self.featured_at {
            vehicle.featured_at = featured_at;
        }
        if let Some(certification_status) = self.certification_status {
            vehicle.certification_status = certification_status;
        }
        if let Some(requested_at) = self.certification_requested_at {
            vehicle.certification_requested_at = requested_at;
        }
        if let Some(boost) = &self.push_boost {
            vehicle.active_boosts.push(boost.clone());
        }
        if let Some(views) = self.views {
            vehicle.views = views;
        }
        if let Some(inquiries) = self.inquiries_count {
            vehicle.inquiries_count = inquiries;
        }
        if let Some(sold_at) = self.sold_at {
            vehicle.sold_at = sold_at;
        }
        vehicle.updated_at = now;
    }
}
