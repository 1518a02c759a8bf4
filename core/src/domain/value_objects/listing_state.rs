//! The reconciled projection of a listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{ListingStatus, VehicleStatus};

/// Expiry instants closer than this are treated as equal
pub const EXPIRY_TOLERANCE_MILLIS: i64 = 1_000;

/// The three fields the entitlement engine owns on a vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingState {
    pub status: VehicleStatus,
    pub listing_status: ListingStatus,
    pub listing_expires_at: Option<DateTime<Utc>>,
}

impl ListingState {
    pub fn published() -> Self {
        Self {
            status: VehicleStatus::Published,
            listing_status: ListingStatus::Active,
            listing_expires_at: None,
        }
    }

    /// Whether persisting `self` over `stored` would change anything
    pub fn differs_from(&self, stored: &ListingState) -> bool {
        self.status != stored.status
            || self.listing_status != stored.listing_status
            || expiry_differs(self.listing_expires_at, stored.listing_expires_at)
    }

    pub fn mark_expired(&mut self) {
        self.status = VehicleStatus::Unpublished;
        self.listing_status = ListingStatus::Expired;
    }

    pub fn mark_suspended(&mut self) {
        self.status = VehicleStatus::Unpublished;
        self.listing_status = ListingStatus::Suspended;
    }

    pub fn mark_active(&mut self) {
        self.status = VehicleStatus::Published;
        self.listing_status = ListingStatus::Active;
    }

    /// Unpublished because it lapsed (not suspended, not sold)
    pub fn is_lapsed(&self) -> bool {
        self.status == VehicleStatus::Unpublished && self.listing_status == ListingStatus::Expired
    }
}

/// Compare two optional expiries within [`EXPIRY_TOLERANCE_MILLIS`]
pub fn expiry_differs(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> bool {
    match (a, b) {
        (None, None) => false,
        (Some(a), Some(b)) => (a - b).num_milliseconds().abs() >= EXPIRY_TOLERANCE_MILLIS,
        _ => true,
    }
}
