//! Vehicle repository trait defining the interface for listing persistence.
//!
//! Listings are returned in insertion order; the reconciler relies on that
//! order to break `created_at` ties.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::{CertificationStatus, Vehicle, VehiclePatch};
use crate::errors::DomainError;

/// Guard evaluated against the stored record by [`VehicleRepository::update_if`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleCondition {
    CertificationStatusIs(CertificationStatus),
    FeaturedIs(bool),
}

impl VehicleCondition {
    pub fn holds_for(&self, vehicle: &Vehicle) -> bool {
        match self {
            VehicleCondition::CertificationStatusIs(status) => {
                vehicle.certification_status == *status
            }
            VehicleCondition::FeaturedIs(featured) => vehicle.is_featured == *featured,
        }
    }
}

/// One entry of a bulk update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleUpdate {
    pub id: Uuid,
    pub patch: VehiclePatch,
}

/// Result of a bulk update; a failed entry never aborts the others
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkUpdateOutcome {
    pub applied: usize,
    pub failed: Vec<(Uuid, String)>,
}

/// Repository trait for Vehicle persistence operations
#[async_trait]
pub trait VehicleRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Vehicle>, DomainError>;

    /// All vehicles owned by a seller, any status
    async fn find_by_seller(&self, seller_email: &str) -> Result<Vec<Vehicle>, DomainError>;

    /// All vehicles with `status = published`
    async fn find_all_published(&self) -> Result<Vec<Vehicle>, DomainError>;

    async fn create(&self, vehicle: Vehicle) -> Result<Vehicle, DomainError>;

    /// Apply a partial update
    ///
    /// # Returns
    /// * `Ok(Some(Vehicle))` - The updated vehicle
    /// * `Ok(None)` - No vehicle with this id
    async fn update(&self, id: Uuid, patch: VehiclePatch) -> Result<Option<Vehicle>, DomainError>;

    /// Apply `patch` only while `condition` holds for the stored record.
    ///
    /// Used by the credit ledger to claim a vehicle flag atomically.
    ///
    /// # Returns
    /// * `Ok(None)` - Vehicle missing or the condition no longer holds
    async fn update_if(
        &self,
        id: Uuid,
        condition: VehicleCondition,
        patch: VehiclePatch,
    ) -> Result<Option<Vehicle>, DomainError>;

    /// Apply many independent updates.
    ///
    /// The default issues one `update` per entry and records failures
    /// without stopping. Adapters with a native bulk write override it.
    async fn bulk_update(
        &self,
        updates: Vec<VehicleUpdate>,
    ) -> Result<BulkUpdateOutcome, DomainError> {
        let mut outcome = BulkUpdateOutcome::default();
        for VehicleUpdate { id, patch } in updates {
            match self.update(id, patch).await {
                Ok(Some(_)) => outcome.applied += 1,
                Ok(None) => outcome.failed.push((id, "vehicle not found".to_string())),
                Err(err) => outcome.failed.push((id, err.to_string())),
            }
        }
        Ok(outcome)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
}
