use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domain::entities::{
    CertificationStatus, PlanDetails, Seller, SellerPatch, Vehicle, VehiclePatch,
};
use crate::errors::{DomainError, DomainResult, EntitlementError};
use crate::repositories::{SellerRepository, VehicleCondition, VehicleRepository};
use crate::services::catalog::PlanCatalog;
use crate::services::entitlement::{remaining_certifications, remaining_featured_credits};

use super::config::CreditLedgerConfig;
use super::receipt::{CertificationReceipt, FeatureReceipt};

const CERTIFICATION_FEATURE: &str = "certification";
const FEATURED_FEATURE: &str = "featured listings";

/// Outcome of trying to consume one unit from a seller counter
enum Spend {
    Consumed(Seller),
    Exhausted(EntitlementError),
}

/// Outcome of a conditional write claiming a vehicle
enum Claim {
    Won(Vehicle),
    /// Another request holds the vehicle; carries the stored record
    Held(Vehicle),
}

pub struct CreditLedger<S, V>
where
    S: SellerRepository,
    V: VehicleRepository,
{
    seller_repository: Arc<S>,
    vehicle_repository: Arc<V>,
    catalog: Arc<dyn PlanCatalog>,
    config: CreditLedgerConfig,
}

impl<S, V> CreditLedger<S, V>
where
    S: SellerRepository,
    V: VehicleRepository,
{
    pub fn new(
        seller_repository: Arc<S>,
        vehicle_repository: Arc<V>,
        catalog: Arc<dyn PlanCatalog>,
        config: CreditLedgerConfig,
    ) -> Self {
        Self {
            seller_repository,
            vehicle_repository,
            catalog,
            config,
        }
    }

    /// Request certification for `vehicle`, consuming one unit of quota.
    ///
    /// Requesting an already-requested vehicle succeeds without consuming.
    pub async fn request_certification(
        &self,
        vehicle: &Vehicle,
        now: DateTime<Utc>,
    ) -> DomainResult<CertificationReceipt> {
        let seller = self.load_seller(&vehicle.seller_email).await?;
        let plan = self.catalog.plan_details(&seller.subscription_plan);
        let allowed = plan.free_certifications;

        if allowed == 0 {
            return Err(EntitlementError::PlanIneligible {
                feature: CERTIFICATION_FEATURE.to_string(),
            }
            .into());
        }
        if seller.used_certifications >= allowed {
            return Err(EntitlementError::QuotaExhausted { allowed }.into());
        }
        if vehicle.certification_status == CertificationStatus::Requested {
            return Ok(Self::certification_receipt(vehicle.clone(), &seller, &plan, true));
        }

        let claim = VehiclePatch {
            certification_status: Some(CertificationStatus::Requested),
            certification_requested_at: Some(Some(now)),
            ..Default::default()
        };
        let condition = VehicleCondition::CertificationStatusIs(CertificationStatus::None);
        let claimed = match self.claim(vehicle.id, condition, claim).await? {
            Claim::Won(claimed) => claimed,
            Claim::Held(current) => {
                let seller = self.load_seller(&vehicle.seller_email).await?;
                return Ok(Self::certification_receipt(current, &seller, &plan, true));
            }
        };

        let spent = self
            .spend(seller, |seller| {
                let plan = self.catalog.plan_details(&seller.subscription_plan);
                let allowed = plan.free_certifications;
                if seller.used_certifications >= allowed {
                    return Err(EntitlementError::QuotaExhausted { allowed });
                }
                Ok(SellerPatch {
                    used_certifications: Some(seller.used_certifications + 1),
                    ..Default::default()
                })
            })
            .await;

        match spent {
            Ok(Spend::Consumed(seller)) => {
                info!(
                    vehicle_id = %vehicle.id,
                    seller = %seller.email,
                    used = seller.used_certifications,
                    "Certification requested"
                );
                let plan = self.catalog.plan_details(&seller.subscription_plan);
                Ok(Self::certification_receipt(claimed, &seller, &plan, false))
            }
            Ok(Spend::Exhausted(err)) => {
                self.release(vehicle.id, Self::certification_release()).await;
                Err(err.into())
            }
            Err(err) => {
                self.release(vehicle.id, Self::certification_release()).await;
                Err(err)
            }
        }
    }

    /// Mark `vehicle` as featured, consuming one featured credit.
    ///
    /// Featuring an already-featured vehicle succeeds without consuming.
    pub async fn feature(
        &self,
        vehicle: &Vehicle,
        now: DateTime<Utc>,
    ) -> DomainResult<FeatureReceipt> {
        let seller = self.load_seller(&vehicle.seller_email).await?;
        let plan = self.catalog.plan_details(&seller.subscription_plan);

        if vehicle.is_featured {
            return Ok(FeatureReceipt {
                vehicle: vehicle.clone(),
                remaining_credits: remaining_featured_credits(&seller, &plan),
                already_featured: true,
            });
        }
        if plan.feature_credit_limit == 0 {
            return Err(EntitlementError::PlanIneligible {
                feature: FEATURED_FEATURE.to_string(),
            }
            .into());
        }
        if remaining_featured_credits(&seller, &plan) == 0 {
            return Err(EntitlementError::CreditsExhausted.into());
        }

        let claim = VehiclePatch {
            is_featured: Some(true),
            featured_at: Some(Some(now)),
            ..Default::default()
        };
        let claimed = match self
            .claim(vehicle.id, VehicleCondition::FeaturedIs(false), claim)
            .await?
        {
            Claim::Won(claimed) => claimed,
            Claim::Held(current) => {
                let seller = self.load_seller(&vehicle.seller_email).await?;
                return Ok(FeatureReceipt {
                    vehicle: current,
                    remaining_credits: remaining_featured_credits(&seller, &plan),
                    already_featured: true,
                });
            }
        };

        let spent = self
            .spend(seller, |seller| {
                let plan = self.catalog.plan_details(&seller.subscription_plan);
                let remaining = remaining_featured_credits(seller, &plan);
                if remaining == 0 {
                    return Err(EntitlementError::CreditsExhausted);
                }
                Ok(SellerPatch {
                    featured_credits: Some(Some(remaining - 1)),
                    ..Default::default()
                })
            })
            .await;

        match spent {
            Ok(Spend::Consumed(seller)) => {
                let plan = self.catalog.plan_details(&seller.subscription_plan);
                let remaining_credits = remaining_featured_credits(&seller, &plan);
                info!(
                    vehicle_id = %vehicle.id,
                    seller = %seller.email,
                    remaining_credits,
                    "Listing featured"
                );
                Ok(FeatureReceipt {
                    vehicle: claimed,
                    remaining_credits,
                    already_featured: false,
                })
            }
            Ok(Spend::Exhausted(err)) => {
                self.release(vehicle.id, Self::feature_release()).await;
                Err(err.into())
            }
            Err(err) => {
                self.release(vehicle.id, Self::feature_release()).await;
                Err(err)
            }
        }
    }

    /// Claim a vehicle with a conditional write.
    ///
    /// A lost claim is re-read. When the competing request has already
    /// released it the claim is retried, otherwise the stored record comes
    /// back as [`Claim::Held`].
    async fn claim(
        &self,
        vehicle_id: Uuid,
        condition: VehicleCondition,
        patch: VehiclePatch,
    ) -> DomainResult<Claim> {
        for attempt in 1..=self.config.max_attempts {
            if let Some(claimed) = self
                .vehicle_repository
                .update_if(vehicle_id, condition, patch.clone())
                .await?
            {
                return Ok(Claim::Won(claimed));
            }

            // Give the holder a chance to settle its spend
            tokio::task::yield_now().await;
            let current = self.load_vehicle(vehicle_id).await?;
            if !condition.holds_for(&current) {
                return Ok(Claim::Held(current));
            }
            debug!(
                vehicle_id = %vehicle_id,
                attempt,
                "Competing claim was released, retrying"
            );
        }

        warn!(
            vehicle_id = %vehicle_id,
            attempts = self.config.max_attempts,
            "Gave up claiming vehicle"
        );
        Err(DomainError::Conflict {
            message: format!("vehicle {} is being updated concurrently", vehicle_id),
        })
    }

    /// Compare-and-set loop over the seller record.
    ///
    /// `next` sees the freshest seller on every attempt and either returns the
    /// patch to apply or the entitlement error that stops the spend.
    async fn spend<F>(&self, mut seller: Seller, next: F) -> DomainResult<Spend>
    where
        F: Fn(&Seller) -> Result<SellerPatch, EntitlementError>,
    {
        for attempt in 1..=self.config.max_attempts {
            let patch = match next(&seller) {
                Ok(patch) => patch,
                Err(err) => return Ok(Spend::Exhausted(err)),
            };

            if let Some(updated) = self
                .seller_repository
                .update_if_version(&seller.email, seller.version, patch)
                .await?
            {
                return Ok(Spend::Consumed(updated));
            }

            debug!(
                seller = %seller.email,
                attempt,
                "Seller version moved, retrying"
            );
            seller = self.load_seller(&seller.email).await?;
        }

        warn!(
            seller = %seller.email,
            attempts = self.config.max_attempts,
            "Gave up consuming seller quota"
        );
        Err(DomainError::Conflict {
            message: format!("seller {} is being updated concurrently", seller.email),
        })
    }

    /// Undo a vehicle claim after the seller counter could not be consumed
    async fn release(&self, vehicle_id: Uuid, patch: VehiclePatch) {
        match self.vehicle_repository.update(vehicle_id, patch).await {
            Ok(_) => debug!(vehicle_id = %vehicle_id, "Released vehicle claim"),
            Err(err) => error!(
                vehicle_id = %vehicle_id,
                error = %err,
                "Failed to release vehicle claim"
            ),
        }
    }

    async fn load_seller(&self, email: &str) -> DomainResult<Seller> {
        self.seller_repository
            .find_by_email(email)
            .await?
            .ok_or_else(|| DomainError::not_found("Seller"))
    }

    async fn load_vehicle(&self, id: Uuid) -> DomainResult<Vehicle> {
        self.vehicle_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Vehicle"))
    }

    fn certification_receipt(
        vehicle: Vehicle,
        seller: &Seller,
        plan: &PlanDetails,
        already_requested: bool,
    ) -> CertificationReceipt {
        CertificationReceipt {
            vehicle,
            used_certifications: seller.used_certifications,
            remaining_certifications: remaining_certifications(seller, plan),
            already_requested,
        }
    }

    fn certification_release() -> VehiclePatch {
        VehiclePatch {
            certification_status: Some(CertificationStatus::None),
            certification_requested_at: Some(None),
            ..Default::default()
        }
    }

    fn feature_release() -> VehiclePatch {
        VehiclePatch {
            is_featured: Some(false),
            featured_at: Some(None),
            ..Default::default()
        }
    }
}
