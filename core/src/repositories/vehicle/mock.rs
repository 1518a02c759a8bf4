//! Mock implementation of VehicleRepository for testing

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::{Vehicle, VehiclePatch};
use crate::errors::DomainError;

use super::trait_::{VehicleCondition, VehicleRepository};

/// In-memory vehicle store keeping insertion order
#[derive(Clone)]
pub struct MockVehicleRepository {
    vehicles: Arc<RwLock<Vec<Vehicle>>>,
    failing: Arc<RwLock<HashSet<Uuid>>>,
    lost_claims: Arc<AtomicUsize>,
    writes: Arc<AtomicUsize>,
}

impl MockVehicleRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self {
            vehicles: Arc::new(RwLock::new(Vec::new())),
            failing: Arc::new(RwLock::new(HashSet::new())),
            lost_claims: Arc::new(AtomicUsize::new(0)),
            writes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a mock pre-populated with vehicles, in the given order
    pub async fn with_vehicles(vehicles: Vec<Vehicle>) -> Self {
        let repo = Self::new();
        repo.vehicles.write().await.extend(vehicles);
        repo
    }

    /// Make updates to this vehicle fail from now on
    pub async fn fail_updates_for(&self, id: Uuid) {
        self.failing.write().await.insert(id);
    }

    /// Make the next `count` conditional updates miss, as if a competing
    /// request had claimed the vehicle and released it again
    pub fn lose_next_claims(&self, count: usize) {
        self.lost_claims.store(count, Ordering::SeqCst);
    }

    /// Number of successful updates so far (creates excluded)
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Snapshot of every stored vehicle
    pub async fn all(&self) -> Vec<Vehicle> {
        self.vehicles.read().await.clone()
    }

    async fn apply(
        &self,
        id: Uuid,
        condition: Option<VehicleCondition>,
        patch: VehiclePatch,
    ) -> Result<Option<Vehicle>, DomainError> {
        tokio::task::yield_now().await;
        if self.failing.read().await.contains(&id) {
            return Err(DomainError::unavailable(format!("write to vehicle {} failed", id)));
        }

        let mut vehicles = self.vehicles.write().await;
        let Some(vehicle) = vehicles.iter_mut().find(|v| v.id == id) else {
            return Ok(None);
        };
        if let Some(condition) = condition {
            if !condition.holds_for(vehicle) {
                return Ok(None);
            }
        }

        patch.apply_to(vehicle, Utc::now());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(Some(vehicle.clone()))
    }
}

impl Default for MockVehicleRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VehicleRepository for MockVehicleRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Vehicle>, DomainError> {
        tokio::task::yield_now().await;
        let vehicles = self.vehicles.read().await;
        Ok(vehicles.iter().find(|v| v.id == id).cloned())
    }

    async fn find_by_seller(&self, seller_email: &str) -> Result<Vec<Vehicle>, DomainError> {
        tokio::task::yield_now().await;
        let vehicles = self.vehicles.read().await;
        Ok(vehicles
            .iter()
            .filter(|v| v.seller_email == seller_email)
            .cloned()
            .collect())
    }

    async fn find_all_published(&self) -> Result<Vec<Vehicle>, DomainError> {
        tokio::task::yield_now().await;
        let vehicles = self.vehicles.read().await;
        Ok(vehicles.iter().filter(|v| v.is_published()).cloned().collect())
    }

    async fn create(&self, vehicle: Vehicle) -> Result<Vehicle, DomainError> {
        tokio::task::yield_now().await;
        let mut vehicles = self.vehicles.write().await;

        if vehicles.iter().any(|v| v.id == vehicle.id) {
            return Err(DomainError::Validation {
                message: "Vehicle id already exists".to_string(),
            });
        }

        vehicles.push(vehicle.clone());
        Ok(vehicle)
    }

    async fn update(&self, id: Uuid, patch: VehiclePatch) -> Result<Option<Vehicle>, DomainError> {
        self.apply(id, None, patch).await
    }

    async fn update_if(
        &self,
        id: Uuid,
        condition: VehicleCondition,
        patch: VehiclePatch,
    ) -> Result<Option<Vehicle>, DomainError> {
        let lost = self
            .lost_claims
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if lost {
            tokio::task::yield_now().await;
            return Ok(None);
        }
        self.apply(id, Some(condition), patch).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        tokio::task::yield_now().await;
        let mut vehicles = self.vehicles.write().await;
        let before = vehicles.len();
        vehicles.retain(|v| v.id != id);
        Ok(vehicles.len() != before)
    }
}
