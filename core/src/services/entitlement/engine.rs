use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use tracing::warn;
use uuid::Uuid;

use crate::domain::entities::{
    ListingLimit, ListingStatus, PlanDetails, Seller, Vehicle, VehicleStatus,
};
use crate::domain::value_objects::{expiry_differs, ListingState};
use crate::errors::EntitlementError;

/// Lifetime of a listing on a date-limited plan
pub const LISTING_DURATION_DAYS: i64 = 30;

/// True iff the seller has a parseable plan expiry strictly before `now`
pub fn is_plan_expired(seller: &Seller, now: DateTime<Utc>) -> bool {
    seller
        .plan_expires_at()
        .map(|expires_at| expires_at < now)
        .unwrap_or(false)
}

/// Expiry to stamp on a listing published now.
///
/// Premium follows the plan expiry (none for lifetime premium). Every other
/// plan gets [`LISTING_DURATION_DAYS`] from `now`. A premium expiry that does
/// not parse is treated like a date-limited plan.
pub fn compute_listing_expiry(seller: &Seller, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let standard = now + Duration::days(LISTING_DURATION_DAYS);

    if !seller.subscription_plan.is_premium() {
        return Some(standard);
    }
    if !seller.has_plan_expiry_date() {
        return None;
    }
    match seller.plan_expires_at() {
        Some(plan_expires_at) => Some(plan_expires_at),
        None => {
            warn!(
                seller = %seller.email,
                plan_expiry_date = ?seller.plan_expiry_date,
                "Unparseable plan expiry date, using standard listing duration"
            );
            Some(standard)
        }
    }
}

/// Target listing state of `vehicle` under the seller's current plan.
///
/// Sold vehicles are returned unchanged.
pub fn evaluate_listing_state(
    vehicle: &Vehicle,
    seller: &Seller,
    now: DateTime<Utc>,
) -> ListingState {
    let mut state = vehicle.listing_state();
    if state.status == VehicleStatus::Sold {
        return state;
    }

    let lifetime = seller.is_premium_lifetime();

    // 1. A lapsed plan takes every published listing down, expiry or not.
    if is_plan_expired(seller, now) && state.status == VehicleStatus::Published {
        state.mark_expired();
    }

    // 2. Published listings always carry an expiry unless lifetime.
    if state.listing_expires_at.is_none() && state.status == VehicleStatus::Published {
        state.listing_expires_at = compute_listing_expiry(seller, now);
    }

    // 3. Premium with a dated plan: listing expiry tracks the plan expiry.
    if seller.subscription_plan.is_premium() {
        if let Some(plan_expires_at) = seller.plan_expires_at() {
            if expiry_differs(state.listing_expires_at, Some(plan_expires_at)) {
                state.listing_expires_at = Some(plan_expires_at);
                if state.is_lapsed() && plan_expires_at > now {
                    state.mark_active();
                }
            }
        }
    }

    // 4. Past its expiry.
    let live = state.status == VehicleStatus::Published
        || state.listing_status == ListingStatus::Suspended;
    if !lifetime && live && state.listing_expires_at.map(|at| at < now).unwrap_or(false) {
        state.mark_expired();
    }

    // 5. Lifetime premium: drop leftovers from a previous dated plan.
    if lifetime {
        if state.listing_expires_at.is_some() {
            state.listing_expires_at = None;
        }
        if state.is_lapsed() {
            state.mark_active();
        }
    }

    state
}

/// Ids of the published vehicles exceeding the plan's listing limit.
///
/// Keeps the newest `created_at` first; ties keep the input order.
pub fn cap_decision(published: &[&Vehicle], limit: ListingLimit) -> HashSet<Uuid> {
    let ListingLimit::Limited(limit) = limit else {
        return HashSet::new();
    };

    let mut ordered: Vec<&Vehicle> = published.to_vec();
    ordered.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    ordered
        .into_iter()
        .skip(limit as usize)
        .map(|vehicle| vehicle.id)
        .collect()
}

/// Whether the seller may publish one more listing
pub fn check_listing_capacity(
    seller: &Seller,
    plan: &PlanDetails,
    published_count: usize,
    now: DateTime<Utc>,
) -> Result<(), EntitlementError> {
    if is_plan_expired(seller, now) {
        return Err(EntitlementError::PlanExpired);
    }
    if let ListingLimit::Limited(limit) = plan.listing_limit {
        if plan.listing_limit.is_reached(published_count) {
            return Err(EntitlementError::LimitReached { limit });
        }
    }
    Ok(())
}

/// Featured credits left; a seller that never spent one has the full allowance
pub fn remaining_featured_credits(seller: &Seller, plan: &PlanDetails) -> u32 {
    seller.featured_credits.unwrap_or(plan.feature_credit_limit)
}

/// Certification requests left under the plan
pub fn remaining_certifications(seller: &Seller, plan: &PlanDetails) -> u32 {
    plan.free_certifications.saturating_sub(seller.used_certifications)
}
