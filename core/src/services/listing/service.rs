use al_shared::config::ListingConfig;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::domain::entities::{
    Boost, BoostPackage, ListingDraft, ListingStatus, PlanKey, Seller, SellerPatch, Vehicle,
    VehiclePatch, VehicleStatus,
};
use crate::domain::value_objects::Actor;
use crate::errors::{DomainError, DomainResult, ValidationError};
use crate::repositories::{SellerRepository, VehicleRepository};
use crate::services::catalog::PlanCatalog;
use crate::services::entitlement::{
    check_listing_capacity, compute_listing_expiry, LISTING_DURATION_DAYS,
};
use crate::services::ledger::{
    CertificationReceipt, CreditLedger, CreditLedgerConfig, FeatureReceipt,
};
use crate::services::reconciler::{ListingReconciler, ReconcileReport};

use super::cache::{ListingViewCache, NoOpListingViewCache};
use super::command::{ActionOutcome, ListingCommand};

/// Seller record after a plan change, with the reconciliation it triggered
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanChange {
    pub seller: Seller,
    pub reconciliation: ReconcileReport,
}

/// Listing action handlers
pub struct ListingService<S, V>
where
    S: SellerRepository,
    V: VehicleRepository,
{
    seller_repository: Arc<S>,
    vehicle_repository: Arc<V>,
    catalog: Arc<dyn PlanCatalog>,
    reconciler: ListingReconciler<S, V>,
    ledger: CreditLedger<S, V>,
    view_cache: Arc<dyn ListingViewCache>,
    config: ListingConfig,
}

impl<S, V> ListingService<S, V>
where
    S: SellerRepository,
    V: VehicleRepository,
{
    /// Create a listing service without a view cache
    pub fn new(
        seller_repository: Arc<S>,
        vehicle_repository: Arc<V>,
        catalog: Arc<dyn PlanCatalog>,
        config: ListingConfig,
    ) -> Self {
        Self::with_cache(
            seller_repository,
            vehicle_repository,
            catalog,
            Arc::new(NoOpListingViewCache),
            config,
        )
    }

    /// Create a listing service backed by a view cache
    pub fn with_cache(
        seller_repository: Arc<S>,
        vehicle_repository: Arc<V>,
        catalog: Arc<dyn PlanCatalog>,
        view_cache: Arc<dyn ListingViewCache>,
        config: ListingConfig,
    ) -> Self {
        let reconciler = ListingReconciler::new(
            seller_repository.clone(),
            vehicle_repository.clone(),
            catalog.clone(),
        );
        let ledger = CreditLedger::new(
            seller_repository.clone(),
            vehicle_repository.clone(),
            catalog.clone(),
            CreditLedgerConfig::from(&config),
        );

        Self {
            seller_repository,
            vehicle_repository,
            catalog,
            reconciler,
            ledger,
            view_cache,
            config,
        }
    }

    pub fn reconciler(&self) -> &ListingReconciler<S, V> {
        &self.reconciler
    }

    /// Publish a new listing for `seller_email`.
    ///
    /// The expiry is computed once here and left to later reconciliation.
    ///
    /// # Errors
    ///
    /// * `Validation` - The draft is malformed
    /// * `Unauthorized` - The actor is neither the seller nor an admin
    /// * `PlanExpired` / `LimitReached` - The plan does not allow another listing
    pub async fn create_listing(
        &self,
        actor: &Actor,
        seller_email: &str,
        draft: ListingDraft,
    ) -> DomainResult<Vehicle> {
        draft.validate()?;
        if !actor.can_act_for(seller_email) {
            return Err(DomainError::Unauthorized);
        }

        let seller = self.load_seller(seller_email).await?;
        let plan = self.catalog.plan_details(&seller.subscription_plan);
        let now = Utc::now();

        let published = self
            .vehicle_repository
            .find_by_seller(&seller.email)
            .await?
            .iter()
            .filter(|vehicle| vehicle.is_published())
            .count();
        check_listing_capacity(&seller, &plan, published, now)?;

        let expires_at = compute_listing_expiry(&seller, now);
        let vehicle = Vehicle::publish(draft, seller.email.clone(), expires_at, now);
        let vehicle = self.vehicle_repository.create(vehicle).await?;
        self.invalidate_views().await;

        info!(
            vehicle_id = %vehicle.id,
            seller = %seller.email,
            plan = %seller.subscription_plan,
            "Listing created"
        );
        Ok(vehicle)
    }

    pub async fn feature_listing(
        &self,
        actor: &Actor,
        vehicle_id: Uuid,
    ) -> DomainResult<FeatureReceipt> {
        let vehicle = self.load_owned(actor, vehicle_id).await?;
        let receipt = self.ledger.feature(&vehicle, Utc::now()).await?;
        if !receipt.already_featured {
            self.invalidate_views().await;
        }
        Ok(receipt)
    }

    pub async fn certify_listing(
        &self,
        actor: &Actor,
        vehicle_id: Uuid,
    ) -> DomainResult<CertificationReceipt> {
        let vehicle = self.load_owned(actor, vehicle_id).await?;
        let receipt = self.ledger.request_certification(&vehicle, Utc::now()).await?;
        if !receipt.already_requested {
            self.invalidate_views().await;
        }
        Ok(receipt)
    }

    /// Append a boost and mark the listing featured.
    ///
    /// Boosts do not consume featured credits.
    pub async fn boost_listing(
        &self,
        actor: &Actor,
        vehicle_id: Uuid,
        package_id: &str,
    ) -> DomainResult<Vehicle> {
        let package = BoostPackage::parse(package_id).ok_or_else(|| {
            DomainError::from(ValidationError::InvalidFormat {
                field: "packageId".to_string(),
            })
        })?;
        let vehicle = self.load_owned(actor, vehicle_id).await?;
        let now = Utc::now();

        let boost = Boost::start(&package, now);
        debug!(
            vehicle_id = %vehicle.id,
            package_id = %package.package_id,
            days = package.duration_days,
            "Boosting listing"
        );
        let patch = VehiclePatch {
            is_featured: Some(true),
            featured_at: (!vehicle.is_featured).then_some(Some(now)),
            push_boost: Some(boost),
            ..Default::default()
        };
        self.write(vehicle.id, patch).await
    }

    pub async fn mark_sold(&self, actor: &Actor, vehicle_id: Uuid) -> DomainResult<Vehicle> {
        let vehicle = self.load_owned(actor, vehicle_id).await?;
        let patch = VehiclePatch {
            status: Some(VehicleStatus::Sold),
            listing_status: Some(ListingStatus::Sold),
            sold_at: Some(Some(Utc::now())),
            ..Default::default()
        };
        let sold = self.write(vehicle.id, patch).await?;
        info!(vehicle_id = %sold.id, seller = %sold.seller_email, "Listing marked sold");
        Ok(sold)
    }

    /// Put a sold, expired or suspended listing back on the market.
    ///
    /// The seller's listings are reconciled straight away, so the returned
    /// record already reflects expiry and the listing cap.
    pub async fn mark_unsold(&self, actor: &Actor, vehicle_id: Uuid) -> DomainResult<Vehicle> {
        let vehicle = self.load_owned(actor, vehicle_id).await?;
        if vehicle.is_published() && vehicle.listing_status == ListingStatus::Active {
            return Err(DomainError::BusinessRule {
                message: "Listing is already on the market".to_string(),
            });
        }
        let patch = VehiclePatch {
            status: Some(VehicleStatus::Published),
            listing_status: Some(ListingStatus::Active),
            sold_at: Some(None),
            ..Default::default()
        };
        self.write(vehicle.id, patch).await?;

        let report = self
            .reconciler
            .reconcile_seller(&vehicle.seller_email, Utc::now())
            .await?;
        if report.updated > 0 {
            self.invalidate_views().await;
        }
        let settled = self
            .vehicle_repository
            .find_by_id(vehicle.id)
            .await?
            .ok_or_else(|| DomainError::not_found("Vehicle"))?;
        info!(
            vehicle_id = %settled.id,
            listing_status = settled.listing_status.as_str(),
            "Listing returned to the market"
        );
        Ok(settled)
    }

    /// Reset engagement counters
    pub async fn refresh_listing(&self, actor: &Actor, vehicle_id: Uuid) -> DomainResult<Vehicle> {
        let vehicle = self.load_owned(actor, vehicle_id).await?;
        let patch = VehiclePatch {
            views: Some(0),
            inquiries_count: Some(0),
            ..Default::default()
        };
        self.write(vehicle.id, patch).await
    }

    /// Extend the listing by the standard duration from now, regardless of plan.
    ///
    /// An expired listing goes back on the market; a suspended one stays
    /// suspended until the cap allows it.
    pub async fn renew_listing(&self, actor: &Actor, vehicle_id: Uuid) -> DomainResult<Vehicle> {
        let vehicle = self.load_owned(actor, vehicle_id).await?;
        let mut patch = VehiclePatch {
            listing_expires_at: Some(Some(Utc::now() + Duration::days(LISTING_DURATION_DAYS))),
            ..Default::default()
        };
        if vehicle.listing_status == ListingStatus::Expired {
            patch.status = Some(VehicleStatus::Published);
            patch.listing_status = Some(ListingStatus::Active);
        }
        self.write(vehicle.id, patch).await
    }

    /// Move a seller to another plan and reconcile their listings.
    ///
    /// Featured credits reset to the new plan's allowance only when the plan
    /// key actually changes. Used certifications carry over unchanged.
    pub async fn change_plan(
        &self,
        actor: &Actor,
        seller_email: &str,
        plan: PlanKey,
        plan_expires_at: Option<DateTime<Utc>>,
    ) -> DomainResult<PlanChange> {
        if !al_shared::validation::is_valid_email(seller_email) {
            return Err(ValidationError::InvalidEmail.into());
        }
        if !actor.can_act_for(seller_email) {
            return Err(DomainError::Unauthorized);
        }

        let allowance = self.catalog.plan_details(&plan).feature_credit_limit;
        let mut seller = self.load_seller(seller_email).await?;
        let mut updated = None;
        for attempt in 1..=self.config.ledger_attempts() {
            let patch = SellerPatch {
                subscription_plan: Some(plan.clone()),
                plan_expiry_date: Some(plan_expires_at.map(|at| at.to_rfc3339())),
                featured_credits: (seller.subscription_plan != plan).then_some(Some(allowance)),
                ..Default::default()
            };
            if let Some(saved) = self
                .seller_repository
                .update_if_version(&seller.email, seller.version, patch)
                .await?
            {
                updated = Some(saved);
                break;
            }
            debug!(
                seller = %seller.email,
                attempt,
                "Seller version moved, retrying plan change"
            );
            seller = self.load_seller(seller_email).await?;
        }
        let Some(seller) = updated else {
            return Err(DomainError::Conflict {
                message: format!("seller {} is being updated concurrently", seller.email),
            });
        };

        info!(seller = %seller.email, plan = %plan, "Subscription plan changed");

        let reconciliation = self.reconciler.reconcile_seller(&seller.email, Utc::now()).await?;
        self.invalidate_views().await;

        Ok(PlanChange {
            seller,
            reconciliation,
        })
    }

    /// Reconcile every published listing and return the result, newest first
    pub async fn reconcile_and_list_published(&self) -> DomainResult<Vec<Vehicle>> {
        let report = self.reconciler.reconcile_all_published(Utc::now()).await?;
        if report.updated > 0 {
            self.invalidate_views().await;
        }
        Ok(report.published)
    }

    /// Published listings, served from the view cache when possible
    pub async fn published_listings(&self) -> DomainResult<Vec<Vehicle>> {
        if self.config.view_cache_enabled {
            match self.view_cache.get_published().await {
                Ok(Some(listings)) => {
                    debug!(count = listings.len(), "Serving published listings from cache");
                    return Ok(listings);
                }
                Ok(None) => {}
                Err(err) => warn!(error = %err, "Listing view cache read failed"),
            }
        }

        let listings = self.reconcile_and_list_published().await?;

        if self.config.view_cache_enabled {
            if let Err(err) = self
                .view_cache
                .put_published(&listings, self.config.view_cache_ttl_seconds)
                .await
            {
                warn!(error = %err, "Listing view cache write failed");
            }
        }
        Ok(listings)
    }

    /// Run one listing command
    pub async fn execute(
        &self,
        actor: &Actor,
        vehicle_id: Uuid,
        command: ListingCommand,
    ) -> DomainResult<ActionOutcome> {
        debug!(vehicle_id = %vehicle_id, action = command.name(), "Executing listing command");
        match command {
            ListingCommand::Feature => self
                .feature_listing(actor, vehicle_id)
                .await
                .map(ActionOutcome::Featured),
            ListingCommand::Certify => self
                .certify_listing(actor, vehicle_id)
                .await
                .map(ActionOutcome::Certified),
            ListingCommand::Boost { package_id } => self
                .boost_listing(actor, vehicle_id, &package_id)
                .await
                .map(ActionOutcome::Updated),
            ListingCommand::Sold => self
                .mark_sold(actor, vehicle_id)
                .await
                .map(ActionOutcome::Updated),
            ListingCommand::Unsold => self
                .mark_unsold(actor, vehicle_id)
                .await
                .map(ActionOutcome::Updated),
            ListingCommand::Refresh => self
                .refresh_listing(actor, vehicle_id)
                .await
                .map(ActionOutcome::Updated),
            ListingCommand::Renew => self
                .renew_listing(actor, vehicle_id)
                .await
                .map(ActionOutcome::Updated),
        }
    }

    async fn load_seller(&self, email: &str) -> DomainResult<Seller> {
        let email = al_shared::validation::normalize_email(email);
        self.seller_repository
            .find_by_email(&email)
            .await?
            .ok_or_else(|| DomainError::not_found("Seller"))
    }

    /// Load a vehicle the actor is allowed to act on
    async fn load_owned(&self, actor: &Actor, vehicle_id: Uuid) -> DomainResult<Vehicle> {
        let vehicle = self
            .vehicle_repository
            .find_by_id(vehicle_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Vehicle"))?;

        if !actor.can_manage(&vehicle) {
            warn!(
                vehicle_id = %vehicle_id,
                actor = %actor.email,
                "Rejected action on listing owned by another seller"
            );
            return Err(DomainError::Unauthorized);
        }
        Ok(vehicle)
    }

    async fn write(&self, vehicle_id: Uuid, patch: VehiclePatch) -> DomainResult<Vehicle> {
        let vehicle = self
            .vehicle_repository
            .update(vehicle_id, patch)
            .await?
            .ok_or_else(|| DomainError::not_found("Vehicle"))?;
        self.invalidate_views().await;
        Ok(vehicle)
    }

    async fn invalidate_views(&self) {
        if let Err(err) = self.view_cache.invalidate().await {
            warn!(error = %err, "Failed to invalidate listing view cache");
        }
    }
}
