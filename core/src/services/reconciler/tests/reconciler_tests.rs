use chrono::Duration;
use std::sync::Arc;

use crate::domain::entities::{ListingStatus, PlanKey, Seller, SellerPatch, Vehicle, VehicleStatus};
use crate::repositories::{
    MockSellerRepository, MockVehicleRepository, SellerRepository, VehicleRepository,
};
use crate::services::catalog::StaticPlanCatalog;
use crate::services::reconciler::{ListingReconciler, ReconcileScope};
use crate::services::test_fixtures::{fixed_now, listing, seller};

const DEALER: &str = "dealer@cars.example";
const PRIVATE: &str = "private@cars.example";

type Reconciler = ListingReconciler<MockSellerRepository, MockVehicleRepository>;

async fn setup(
    sellers: Vec<Seller>,
    vehicles: Vec<Vehicle>,
) -> (Reconciler, Arc<MockSellerRepository>, Arc<MockVehicleRepository>) {
    let seller_repo = Arc::new(MockSellerRepository::with_sellers(sellers).await);
    let vehicle_repo = Arc::new(MockVehicleRepository::with_vehicles(vehicles).await);
    let reconciler = ListingReconciler::new(
        seller_repo.clone(),
        vehicle_repo.clone(),
        Arc::new(StaticPlanCatalog::default()),
    );
    (reconciler, seller_repo, vehicle_repo)
}

async fn stored(repo: &MockVehicleRepository, vehicle: &Vehicle) -> Vehicle {
    repo.find_by_id(vehicle.id).await.unwrap().unwrap()
}

#[tokio::test]
async fn test_free_plan_keeps_only_newest_listing() {
    let older = listing(DEALER, 10);
    let newer = listing(DEALER, 2);
    let (reconciler, _, vehicles) =
        setup(vec![seller(DEALER, PlanKey::Free)], vec![older.clone(), newer.clone()]).await;

    let report = reconciler.reconcile_all_published(fixed_now()).await.unwrap();

    assert_eq!(report.suspended, 1);
    let older = stored(&vehicles, &older).await;
    assert_eq!(older.status, VehicleStatus::Unpublished);
    assert_eq!(older.listing_status, ListingStatus::Suspended);

    let newer = stored(&vehicles, &newer).await;
    assert_eq!(newer.status, VehicleStatus::Published);
    assert_eq!(newer.listing_status, ListingStatus::Active);

    assert_eq!(report.published.len(), 1);
    assert_eq!(report.published[0].id, newer.id);
}

#[tokio::test]
async fn test_second_pass_writes_nothing() {
    let now = fixed_now();
    let mut stale = listing(PRIVATE, 40);
    stale.listing_expires_at = Some(now - Duration::days(10));
    let (reconciler, _, vehicles) = setup(
        vec![seller(DEALER, PlanKey::Free), seller(PRIVATE, PlanKey::Pro)],
        vec![listing(DEALER, 3), listing(DEALER, 1), stale, listing(PRIVATE, 2)],
    )
    .await;

    let first = reconciler.reconcile_all_published(now).await.unwrap();
    assert!(first.updated > 0);
    let writes_after_first = vehicles.write_count();

    let second = reconciler.reconcile_all_published(now).await.unwrap();
    assert_eq!(second.attempted_writes(), 0);
    assert_eq!(vehicles.write_count(), writes_after_first);

    let seller_pass = reconciler.reconcile_seller(DEALER, now).await.unwrap();
    assert_eq!(seller_pass.attempted_writes(), 0);
}

#[tokio::test]
async fn test_expired_plan_unpublishes_every_listing() {
    let now = fixed_now();
    let mut with_expiry = listing(DEALER, 5);
    with_expiry.listing_expires_at = Some(now + Duration::days(25));
    let without_expiry = listing(DEALER, 1);

    let lapsed = seller(DEALER, PlanKey::Pro).with_plan_expiry(now - Duration::days(3));
    let (reconciler, _, vehicles) =
        setup(vec![lapsed], vec![with_expiry.clone(), without_expiry.clone()]).await;

    let report = reconciler.reconcile_all_published(now).await.unwrap();

    assert!(report.published.is_empty());
    for vehicle in [&with_expiry, &without_expiry] {
        let vehicle = stored(&vehicles, vehicle).await;
        assert_eq!(vehicle.status, VehicleStatus::Unpublished);
        assert_eq!(vehicle.listing_status, ListingStatus::Expired);
    }
}

#[tokio::test]
async fn test_lifetime_premium_clears_stale_expiry() {
    let now = fixed_now();
    let mut published = listing(DEALER, 50);
    published.listing_expires_at = Some(now - Duration::days(20));
    let mut lapsed = listing(DEALER, 60);
    lapsed.status = VehicleStatus::Unpublished;
    lapsed.listing_status = ListingStatus::Expired;
    lapsed.listing_expires_at = Some(now - Duration::days(30));

    let (reconciler, _, vehicles) = setup(
        vec![seller(DEALER, PlanKey::Premium)],
        vec![published.clone(), lapsed.clone()],
    )
    .await;

    reconciler.reconcile_seller(DEALER, now).await.unwrap();

    for vehicle in [&published, &lapsed] {
        let vehicle = stored(&vehicles, vehicle).await;
        assert_eq!(vehicle.status, VehicleStatus::Published);
        assert_eq!(vehicle.listing_status, ListingStatus::Active);
        assert_eq!(vehicle.listing_expires_at, None);
    }
}

#[tokio::test]
async fn test_premium_listings_track_plan_expiry() {
    let now = fixed_now();
    let plan_end = now + Duration::days(120);
    let mut a = listing(DEALER, 4);
    a.listing_expires_at = Some(now + Duration::days(3));
    let b = listing(DEALER, 2);

    let premium = seller(DEALER, PlanKey::Premium).with_plan_expiry(plan_end);
    let (reconciler, _, vehicles) = setup(vec![premium], vec![a.clone(), b.clone()]).await;

    reconciler.reconcile_all_published(now).await.unwrap();

    for vehicle in [&a, &b] {
        let vehicle = stored(&vehicles, vehicle).await;
        let drift = (vehicle.listing_expires_at.unwrap() - plan_end).num_milliseconds().abs();
        assert!(drift < 1_000);
    }
}

#[tokio::test]
async fn test_unknown_seller_is_skipped() {
    let orphan = listing("gone@cars.example", 3);
    let (reconciler, _, vehicles) = setup(vec![], vec![orphan.clone()]).await;

    let report = reconciler.reconcile_all_published(fixed_now()).await.unwrap();

    assert_eq!(report.orphaned, 1);
    assert_eq!(report.attempted_writes(), 0);
    assert_eq!(vehicles.write_count(), 0);
    assert_eq!(stored(&vehicles, &orphan).await.listing_expires_at, None);
    assert_eq!(report.published.len(), 1);
}

#[tokio::test]
async fn test_failed_write_does_not_abort_batch() {
    let broken = listing(PRIVATE, 3);
    let healthy = listing(PRIVATE, 2);
    let (reconciler, _, vehicles) = setup(
        vec![seller(PRIVATE, PlanKey::Pro)],
        vec![broken.clone(), healthy.clone()],
    )
    .await;
    vehicles.fail_updates_for(broken.id).await;

    let report = reconciler.reconcile_all_published(fixed_now()).await.unwrap();

    assert_eq!(report.updated, 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, broken.id);
    assert!(stored(&vehicles, &healthy).await.listing_expires_at.is_some());
}

#[tokio::test]
async fn test_seller_lookup_failure_leaves_listings_untouched() {
    let (reconciler, sellers, vehicles) =
        setup(vec![seller(DEALER, PlanKey::Free)], vec![listing(DEALER, 3), listing(DEALER, 1)])
            .await;
    sellers.set_unavailable(true).await;

    let report = reconciler.reconcile_all_published(fixed_now()).await.unwrap();

    assert_eq!(report.orphaned, 2);
    assert_eq!(vehicles.write_count(), 0);
}

#[tokio::test]
async fn test_upgrade_reinstates_suspended_listings() {
    let now = fixed_now();
    let vehicles_in: Vec<Vehicle> = (1..=3).map(|age| listing(DEALER, age)).collect();
    let (reconciler, sellers, vehicles) =
        setup(vec![seller(DEALER, PlanKey::Free)], vehicles_in.clone()).await;

    let first = reconciler.reconcile_all_published(now).await.unwrap();
    assert_eq!(first.suspended, 2);

    let current = sellers.find_by_email(DEALER).await.unwrap().unwrap();
    let patch = SellerPatch {
        subscription_plan: Some(PlanKey::Pro),
        ..Default::default()
    };
    sellers
        .update_if_version(DEALER, current.version, patch)
        .await
        .unwrap()
        .unwrap();

    let report = reconciler.reconcile_seller(DEALER, now).await.unwrap();
    assert_eq!(report.reinstated, 2);
    assert_eq!(report.published.len(), 3);

    for vehicle in &vehicles_in {
        let vehicle = stored(&vehicles, vehicle).await;
        assert_eq!(vehicle.status, VehicleStatus::Published);
        assert!(vehicle.listing_expires_at.is_some());
    }
}

#[tokio::test]
async fn test_seller_scope_keeps_newest_suspended_over_older_published() {
    let now = fixed_now();
    let older = listing(DEALER, 8);
    let mut newer_suspended = listing(DEALER, 1);
    newer_suspended.status = VehicleStatus::Unpublished;
    newer_suspended.listing_status = ListingStatus::Suspended;

    let (reconciler, _, vehicles) = setup(
        vec![seller(DEALER, PlanKey::Free)],
        vec![older.clone(), newer_suspended.clone()],
    )
    .await;

    let report = reconciler
        .reconcile(ReconcileScope::Seller(DEALER.to_string()), now)
        .await
        .unwrap();

    assert_eq!(report.suspended, 1);
    assert_eq!(report.reinstated, 1);
    assert_eq!(stored(&vehicles, &older).await.listing_status, ListingStatus::Suspended);
    assert_eq!(
        stored(&vehicles, &newer_suspended).await.status,
        VehicleStatus::Published
    );
}

#[tokio::test]
async fn test_published_view_is_newest_first_and_within_limits() {
    let now = fixed_now();
    let mut input = Vec::new();
    for age in [9, 3, 7, 1] {
        input.push(listing(DEALER, age));
    }
    for age in [5, 2] {
        input.push(listing(PRIVATE, age));
    }
    let (reconciler, _, _) = setup(
        vec![seller(DEALER, PlanKey::Pro), seller(PRIVATE, PlanKey::Free)],
        input,
    )
    .await;

    let report = reconciler.reconcile_all_published(now).await.unwrap();

    let private = report
        .published
        .iter()
        .filter(|v| v.seller_email == PRIVATE)
        .count();
    assert_eq!(private, 1);
    assert_eq!(report.published.len(), 5);
    assert!(report
        .published
        .windows(2)
        .all(|pair| pair[0].created_at >= pair[1].created_at));
}
