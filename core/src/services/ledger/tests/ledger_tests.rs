use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{CertificationStatus, PlanKey, Seller, Vehicle};
use crate::errors::{DomainError, EntitlementError};
use crate::repositories::{
    MockSellerRepository, MockVehicleRepository, SellerRepository, VehicleRepository,
};
use crate::services::catalog::StaticPlanCatalog;
use crate::services::ledger::{CreditLedger, CreditLedgerConfig};
use crate::services::test_fixtures::{fixed_now, listing, seller};

const DEALER: &str = "dealer@cars.example";

pub(super) type Ledger = CreditLedger<MockSellerRepository, MockVehicleRepository>;

pub(super) async fn setup(
    account: Seller,
    vehicles: Vec<Vehicle>,
) -> (Ledger, Arc<MockSellerRepository>, Arc<MockVehicleRepository>) {
    let seller_repo = Arc::new(MockSellerRepository::with_sellers(vec![account]).await);
    let vehicle_repo = Arc::new(MockVehicleRepository::with_vehicles(vehicles).await);
    let ledger = CreditLedger::new(
        seller_repo.clone(),
        vehicle_repo.clone(),
        Arc::new(StaticPlanCatalog::default()),
        CreditLedgerConfig::default(),
    );
    (ledger, seller_repo, vehicle_repo)
}

#[tokio::test]
async fn test_certification_consumes_one_unit() {
    let vehicle = listing(DEALER, 1);
    let (ledger, sellers, vehicles) =
        setup(seller(DEALER, PlanKey::Pro), vec![vehicle.clone()]).await;

    let receipt = ledger.request_certification(&vehicle, fixed_now()).await.unwrap();

    assert!(!receipt.already_requested);
    assert_eq!(receipt.used_certifications, 1);
    assert_eq!(receipt.remaining_certifications, 1);
    assert_eq!(receipt.vehicle.certification_status, CertificationStatus::Requested);
    assert_eq!(receipt.vehicle.certification_requested_at, Some(fixed_now()));

    let stored = vehicles.find_by_id(vehicle.id).await.unwrap().unwrap();
    assert_eq!(stored.certification_status, CertificationStatus::Requested);
    let account = sellers.find_by_email(DEALER).await.unwrap().unwrap();
    assert_eq!(account.used_certifications, 1);
}

#[tokio::test]
async fn test_repeat_certification_is_idempotent() {
    let vehicle = listing(DEALER, 1);
    let (ledger, sellers, vehicles) =
        setup(seller(DEALER, PlanKey::Pro), vec![vehicle.clone()]).await;

    ledger.request_certification(&vehicle, fixed_now()).await.unwrap();
    let current = vehicles.find_by_id(vehicle.id).await.unwrap().unwrap();
    let again = ledger.request_certification(&current, fixed_now()).await.unwrap();

    assert!(again.already_requested);
    assert_eq!(again.used_certifications, 1);
    assert_eq!(sellers.find_by_email(DEALER).await.unwrap().unwrap().used_certifications, 1);
}

#[tokio::test]
async fn test_free_plan_cannot_certify() {
    let vehicle = listing(DEALER, 1);
    let (ledger, _, vehicles) = setup(seller(DEALER, PlanKey::Free), vec![vehicle.clone()]).await;

    let result = ledger.request_certification(&vehicle, fixed_now()).await;
    assert!(matches!(
        result,
        Err(DomainError::Entitlement(EntitlementError::PlanIneligible { .. }))
    ));
    assert_eq!(vehicles.write_count(), 0);
}

#[tokio::test]
async fn test_certification_quota_exhausted() {
    let vehicle = listing(DEALER, 1);
    let mut account = seller(DEALER, PlanKey::Pro);
    account.used_certifications = 2;
    let (ledger, _, vehicles) = setup(account, vec![vehicle.clone()]).await;

    let result = ledger.request_certification(&vehicle, fixed_now()).await;
    assert!(matches!(
        result,
        Err(DomainError::Entitlement(EntitlementError::QuotaExhausted { allowed: 2 }))
    ));
    assert_eq!(vehicles.write_count(), 0);
}

#[tokio::test]
async fn test_feature_spends_credit() {
    let vehicle = listing(DEALER, 1);
    let (ledger, sellers, _) = setup(seller(DEALER, PlanKey::Premium), vec![vehicle.clone()]).await;

    let receipt = ledger.feature(&vehicle, fixed_now()).await.unwrap();

    assert!(receipt.vehicle.is_featured);
    assert_eq!(receipt.vehicle.featured_at, Some(fixed_now()));
    assert_eq!(receipt.remaining_credits, 4);
    let account = sellers.find_by_email(DEALER).await.unwrap().unwrap();
    assert_eq!(account.featured_credits, Some(4));
}

#[tokio::test]
async fn test_featured_vehicle_is_not_charged_again() {
    let mut vehicle = listing(DEALER, 1);
    vehicle.is_featured = true;
    let (ledger, sellers, _) = setup(seller(DEALER, PlanKey::Pro), vec![vehicle.clone()]).await;

    let receipt = ledger.feature(&vehicle, fixed_now()).await.unwrap();

    assert!(receipt.already_featured);
    assert_eq!(receipt.remaining_credits, 2);
    assert_eq!(sellers.write_count(), 0);
}

#[tokio::test]
async fn test_free_plan_cannot_feature() {
    let vehicle = listing(DEALER, 1);
    let (ledger, _, _) = setup(seller(DEALER, PlanKey::Free), vec![vehicle.clone()]).await;

    let result = ledger.feature(&vehicle, fixed_now()).await;
    assert!(matches!(
        result,
        Err(DomainError::Entitlement(EntitlementError::PlanIneligible { .. }))
    ));
}

#[tokio::test]
async fn test_feature_with_no_credits_left() {
    let vehicle = listing(DEALER, 1);
    let mut account = seller(DEALER, PlanKey::Pro);
    account.featured_credits = Some(0);
    let (ledger, sellers, vehicles) = setup(account, vec![vehicle.clone()]).await;

    let result = ledger.feature(&vehicle, fixed_now()).await;
    assert!(matches!(
        result,
        Err(DomainError::Entitlement(EntitlementError::CreditsExhausted))
    ));
    assert_eq!(
        sellers.find_by_email(DEALER).await.unwrap().unwrap().featured_credits,
        Some(0)
    );
    assert!(!vehicles.find_by_id(vehicle.id).await.unwrap().unwrap().is_featured);
}

#[tokio::test]
async fn test_missing_vehicle_is_not_charged() {
    let vehicle = listing(DEALER, 1);
    let (ledger, sellers, _) = setup(seller(DEALER, PlanKey::Pro), vec![vehicle.clone()]).await;

    let missing = Vehicle {
        id: Uuid::new_v4(),
        ..vehicle
    };
    let result = ledger.request_certification(&missing, fixed_now()).await;

    assert!(matches!(result, Err(DomainError::NotFound { .. })));
    assert_eq!(sellers.write_count(), 0);
}
