use std::sync::atomic::Ordering;

use crate::domain::entities::PlanKey;
use crate::domain::value_objects::Actor;
use crate::services::test_fixtures::{listing, seller};

use super::mocks::harness;

const DEALER: &str = "dealer@cars.example";

#[tokio::test]
async fn test_second_read_is_served_from_cache() {
    let h = harness(vec![seller(DEALER, PlanKey::Pro)], vec![listing(DEALER, 1)]).await;

    let first = h.service.published_listings().await.unwrap();
    let second = h.service.published_listings().await.unwrap();

    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert_eq!(h.cache.puts.load(Ordering::SeqCst), 1);
    assert_eq!(h.cache.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_write_invalidates_cached_view() {
    let vehicle = listing(DEALER, 1);
    let h = harness(vec![seller(DEALER, PlanKey::Pro)], vec![vehicle.clone()]).await;

    assert_eq!(h.service.published_listings().await.unwrap().len(), 1);
    h.service
        .mark_sold(&Actor::seller(DEALER), vehicle.id)
        .await
        .unwrap();

    assert!(h.service.published_listings().await.unwrap().is_empty());
    assert_eq!(h.cache.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_cache_failure_falls_back_to_reconciliation() {
    let h = harness(vec![seller(DEALER, PlanKey::Pro)], vec![listing(DEALER, 1)]).await;
    h.cache.broken.store(true, Ordering::SeqCst);

    let listings = h.service.published_listings().await.unwrap();
    assert_eq!(listings.len(), 1);
}
