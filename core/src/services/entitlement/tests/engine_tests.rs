use chrono::Duration;

use crate::domain::entities::{ListingLimit, ListingStatus, PlanKey, VehicleStatus};
use crate::errors::EntitlementError;
use crate::services::catalog::{PlanCatalog, StaticPlanCatalog};
use crate::services::entitlement::*;
use crate::services::test_fixtures::{fixed_now, listing, seller};

const EMAIL: &str = "dealer@cars.example";

#[test]
fn test_is_plan_expired() {
    let now = fixed_now();

    assert!(!is_plan_expired(&seller(EMAIL, PlanKey::Pro), now));
    assert!(is_plan_expired(
        &seller(EMAIL, PlanKey::Pro).with_plan_expiry(now - Duration::days(1)),
        now
    ));
    assert!(!is_plan_expired(
        &seller(EMAIL, PlanKey::Pro).with_plan_expiry(now + Duration::days(1)),
        now
    ));
    // Equal to now is not strictly before
    assert!(!is_plan_expired(&seller(EMAIL, PlanKey::Pro).with_plan_expiry(now), now));
    assert!(is_plan_expired(
        &seller(EMAIL, PlanKey::Pro).with_raw_plan_expiry("2026-02-01"),
        now
    ));
    assert!(!is_plan_expired(
        &seller(EMAIL, PlanKey::Pro).with_raw_plan_expiry("next tuesday"),
        now
    ));
}

#[test]
fn test_compute_listing_expiry() {
    let now = fixed_now();
    let standard = Some(now + Duration::days(LISTING_DURATION_DAYS));
    let plan_end = now + Duration::days(90);

    assert_eq!(compute_listing_expiry(&seller(EMAIL, PlanKey::Free), now), standard);
    assert_eq!(compute_listing_expiry(&seller(EMAIL, PlanKey::Pro), now), standard);
    assert_eq!(
        compute_listing_expiry(&seller(EMAIL, PlanKey::from("dealer")), now),
        standard
    );
    assert_eq!(
        compute_listing_expiry(&seller(EMAIL, PlanKey::Premium).with_plan_expiry(plan_end), now),
        Some(plan_end)
    );
    assert_eq!(compute_listing_expiry(&seller(EMAIL, PlanKey::Premium), now), None);
    assert_eq!(
        compute_listing_expiry(
            &seller(EMAIL, PlanKey::Premium).with_raw_plan_expiry("soon"),
            now
        ),
        standard
    );
}

#[test]
fn test_published_listing_gets_expiry_assigned() {
    let now = fixed_now();
    let vehicle = listing(EMAIL, 2);

    let state = evaluate_listing_state(&vehicle, &seller(EMAIL, PlanKey::Pro), now);
    assert_eq!(state.status, VehicleStatus::Published);
    assert_eq!(state.listing_status, ListingStatus::Active);
    assert_eq!(state.listing_expires_at, Some(now + Duration::days(30)));
}

#[test]
fn test_expired_plan_unpublishes_listing_without_expiry() {
    let now = fixed_now();
    let lapsed = seller(EMAIL, PlanKey::Pro).with_plan_expiry(now - Duration::hours(1));

    let no_expiry = listing(EMAIL, 2);
    let mut future_expiry = listing(EMAIL, 1);
    future_expiry.listing_expires_at = Some(now + Duration::days(20));

    for vehicle in [no_expiry, future_expiry] {
        let state = evaluate_listing_state(&vehicle, &lapsed, now);
        assert_eq!(state.status, VehicleStatus::Unpublished);
        assert_eq!(state.listing_status, ListingStatus::Expired);
    }
}

#[test]
fn test_premium_expiry_tracks_plan_expiry() {
    let now = fixed_now();
    let plan_end = now + Duration::days(60);
    let premium = seller(EMAIL, PlanKey::Premium).with_plan_expiry(plan_end);

    let mut vehicle = listing(EMAIL, 3);
    vehicle.listing_expires_at = Some(now + Duration::days(5));

    let state = evaluate_listing_state(&vehicle, &premium, now);
    assert_eq!(state.listing_expires_at, Some(plan_end));
    assert_eq!(state.status, VehicleStatus::Published);
}

#[test]
fn test_premium_sync_ignores_sub_second_drift() {
    let now = fixed_now();
    let plan_end = now + Duration::days(60);
    let premium = seller(EMAIL, PlanKey::Premium).with_plan_expiry(plan_end);

    let mut vehicle = listing(EMAIL, 3);
    let stored = plan_end + Duration::milliseconds(400);
    vehicle.listing_expires_at = Some(stored);

    let state = evaluate_listing_state(&vehicle, &premium, now);
    assert_eq!(state.listing_expires_at, Some(stored));
}

#[test]
fn test_premium_renewal_reactivates_lapsed_listing() {
    let now = fixed_now();
    let renewed = seller(EMAIL, PlanKey::Premium).with_plan_expiry(now + Duration::days(365));

    let mut vehicle = listing(EMAIL, 40);
    vehicle.status = VehicleStatus::Unpublished;
    vehicle.listing_status = ListingStatus::Expired;
    vehicle.listing_expires_at = Some(now - Duration::days(10));

    let state = evaluate_listing_state(&vehicle, &renewed, now);
    assert_eq!(state.status, VehicleStatus::Published);
    assert_eq!(state.listing_status, ListingStatus::Active);
    assert_eq!(state.listing_expires_at, Some(now + Duration::days(365)));
}

#[test]
fn test_past_expiry_unpublishes() {
    let now = fixed_now();
    let mut vehicle = listing(EMAIL, 31);
    vehicle.listing_expires_at = Some(now - Duration::minutes(5));

    let state = evaluate_listing_state(&vehicle, &seller(EMAIL, PlanKey::Pro), now);
    assert_eq!(state.status, VehicleStatus::Unpublished);
    assert_eq!(state.listing_status, ListingStatus::Expired);
    assert_eq!(state.listing_expires_at, vehicle.listing_expires_at);
}

#[test]
fn test_suspended_listing_past_expiry_becomes_expired() {
    let now = fixed_now();
    let mut vehicle = listing(EMAIL, 31);
    vehicle.status = VehicleStatus::Unpublished;
    vehicle.listing_status = ListingStatus::Suspended;
    vehicle.listing_expires_at = Some(now - Duration::days(1));

    let state = evaluate_listing_state(&vehicle, &seller(EMAIL, PlanKey::Free), now);
    assert_eq!(state.listing_status, ListingStatus::Expired);
}

#[test]
fn test_lifetime_premium_clears_stale_expiry() {
    let now = fixed_now();
    let mut vehicle = listing(EMAIL, 45);
    vehicle.status = VehicleStatus::Unpublished;
    vehicle.listing_status = ListingStatus::Expired;
    vehicle.listing_expires_at = Some(now - Duration::days(15));

    let state = evaluate_listing_state(&vehicle, &seller(EMAIL, PlanKey::Premium), now);
    assert_eq!(state.status, VehicleStatus::Published);
    assert_eq!(state.listing_status, ListingStatus::Active);
    assert_eq!(state.listing_expires_at, None);
}

#[test]
fn test_sold_listing_is_untouched() {
    let now = fixed_now();
    let mut vehicle = listing(EMAIL, 60);
    vehicle.status = VehicleStatus::Sold;
    vehicle.listing_status = ListingStatus::Sold;
    vehicle.listing_expires_at = Some(now - Duration::days(30));

    let lapsed = seller(EMAIL, PlanKey::Free).with_plan_expiry(now - Duration::days(1));
    assert_eq!(evaluate_listing_state(&vehicle, &lapsed, now), vehicle.listing_state());
}

#[test]
fn test_evaluation_is_a_fixed_point() {
    let now = fixed_now();
    let sellers = [
        seller(EMAIL, PlanKey::Free),
        seller(EMAIL, PlanKey::Pro).with_plan_expiry(now - Duration::days(2)),
        seller(EMAIL, PlanKey::Premium),
        seller(EMAIL, PlanKey::Premium).with_plan_expiry(now + Duration::days(10)),
        seller(EMAIL, PlanKey::Premium).with_raw_plan_expiry("garbage"),
    ];

    let mut stale = listing(EMAIL, 50);
    stale.listing_expires_at = Some(now - Duration::days(20));
    let fresh = listing(EMAIL, 1);

    for seller in &sellers {
        for vehicle in [&stale, &fresh] {
            let first = evaluate_listing_state(vehicle, seller, now);
            let mut applied = vehicle.clone();
            applied.set_listing_state(&first);
            let second = evaluate_listing_state(&applied, seller, now);
            assert!(
                !second.differs_from(&first),
                "not stable for plan {}",
                seller.subscription_plan
            );
        }
    }
}

#[test]
fn test_cap_decision_keeps_newest() {
    let older = listing(EMAIL, 5);
    let newer = listing(EMAIL, 1);

    let suspended = cap_decision(&[&older, &newer], ListingLimit::Limited(1));
    assert_eq!(suspended.len(), 1);
    assert!(suspended.contains(&older.id));
}

#[test]
fn test_cap_decision_ties_keep_input_order() {
    let first = listing(EMAIL, 3);
    let mut second = listing(EMAIL, 3);
    second.created_at = first.created_at;

    let suspended = cap_decision(&[&first, &second], ListingLimit::Limited(1));
    assert!(suspended.contains(&second.id));
    assert!(!suspended.contains(&first.id));
}

#[test]
fn test_cap_decision_within_limit_or_unlimited() {
    let vehicles: Vec<_> = (0..4).map(|age| listing(EMAIL, age)).collect();
    let refs: Vec<_> = vehicles.iter().collect();

    assert!(cap_decision(&refs, ListingLimit::Limited(10)).is_empty());
    assert!(cap_decision(&refs, ListingLimit::Unlimited).is_empty());
    assert_eq!(cap_decision(&refs, ListingLimit::Limited(0)).len(), 4);
}

#[test]
fn test_check_listing_capacity() {
    let now = fixed_now();
    let catalog = StaticPlanCatalog::default();
    let free = catalog.plan_details(&PlanKey::Free);
    let premium = catalog.plan_details(&PlanKey::Premium);

    assert!(check_listing_capacity(&seller(EMAIL, PlanKey::Free), &free, 0, now).is_ok());
    assert_eq!(
        check_listing_capacity(&seller(EMAIL, PlanKey::Free), &free, 1, now),
        Err(EntitlementError::LimitReached { limit: 1 })
    );
    assert!(
        check_listing_capacity(&seller(EMAIL, PlanKey::Premium), &premium, 500, now).is_ok()
    );

    let lapsed = seller(EMAIL, PlanKey::Premium).with_plan_expiry(now - Duration::days(1));
    assert_eq!(
        check_listing_capacity(&lapsed, &premium, 0, now),
        Err(EntitlementError::PlanExpired)
    );
}

#[test]
fn test_remaining_quotas() {
    let catalog = StaticPlanCatalog::default();
    let pro = catalog.plan_details(&PlanKey::Pro);

    let mut account = seller(EMAIL, PlanKey::Pro);
    assert_eq!(remaining_featured_credits(&account, &pro), 2);
    assert_eq!(remaining_certifications(&account, &pro), 2);

    account.featured_credits = Some(0);
    account.used_certifications = 5;
    assert_eq!(remaining_featured_credits(&account, &pro), 0);
    assert_eq!(remaining_certifications(&account, &pro), 0);
}
