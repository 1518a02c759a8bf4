use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::entities::{ListingStatus, Seller, Vehicle, VehiclePatch, VehicleStatus};
use crate::errors::DomainResult;
use crate::repositories::{SellerRepository, VehicleRepository, VehicleUpdate};
use crate::services::catalog::PlanCatalog;
use crate::services::entitlement::{cap_decision, evaluate_listing_state, is_plan_expired};

use super::report::{ReconcileReport, ReconcileScope};

/// Orchestrates reconciliation passes.
///
/// Writes only to the vehicle store. Running a pass twice with no change in
/// between issues no writes the second time.
pub struct ListingReconciler<S, V>
where
    S: SellerRepository,
    V: VehicleRepository,
{
    seller_repository: Arc<S>,
    vehicle_repository: Arc<V>,
    catalog: Arc<dyn PlanCatalog>,
}

impl<S, V> ListingReconciler<S, V>
where
    S: SellerRepository,
    V: VehicleRepository,
{
    pub fn new(
        seller_repository: Arc<S>,
        vehicle_repository: Arc<V>,
        catalog: Arc<dyn PlanCatalog>,
    ) -> Self {
        Self {
            seller_repository,
            vehicle_repository,
            catalog,
        }
    }

    /// Sweep every published listing
    pub async fn reconcile_all_published(
        &self,
        now: DateTime<Utc>,
    ) -> DomainResult<ReconcileReport> {
        self.reconcile(ReconcileScope::AllPublished, now).await
    }

    /// Sweep one seller's listings, reinstating suspended ones the cap allows
    pub async fn reconcile_seller(
        &self,
        seller_email: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<ReconcileReport> {
        let email = al_shared::validation::normalize_email(seller_email);
        self.reconcile(ReconcileScope::Seller(email), now).await
    }

    /// Run one pass over `scope`.
    ///
    /// Only loading the candidates can fail the pass. A seller lookup failure
    /// leaves every candidate untouched, and failed writes land in
    /// [`ReconcileReport::failed`].
    pub async fn reconcile(
        &self,
        scope: ReconcileScope,
        now: DateTime<Utc>,
    ) -> DomainResult<ReconcileReport> {
        let candidates: Vec<Vehicle> = match &scope {
            ReconcileScope::AllPublished => self.vehicle_repository.find_all_published().await?,
            ReconcileScope::Seller(email) => self
                .vehicle_repository
                .find_by_seller(email)
                .await?
                .into_iter()
                .filter(|vehicle| !vehicle.is_sold())
                .collect(),
        };

        let mut report = ReconcileReport {
            candidates: candidates.len(),
            ..Default::default()
        };

        let sellers = self.load_sellers(&candidates).await;

        // Working copies carry the projected state; `candidates` keeps the stored one.
        let mut working: Vec<Vehicle> = Vec::with_capacity(candidates.len());
        for vehicle in &candidates {
            let mut projected = vehicle.clone();
            match sellers.get(&vehicle.seller_email) {
                Some(seller) => {
                    projected.set_listing_state(&evaluate_listing_state(vehicle, seller, now));
                    report.evaluated += 1;
                }
                None => {
                    debug!(
                        vehicle_id = %vehicle.id,
                        seller = %vehicle.seller_email,
                        "Skipping listing with unknown seller"
                    );
                    report.orphaned += 1;
                }
            }
            working.push(projected);
        }

        self.apply_caps(&mut working, &sellers, now, &mut report);

        let updates: Vec<VehicleUpdate> = candidates
            .iter()
            .zip(&working)
            .filter_map(|(stored, projected)| {
                let target = projected.listing_state();
                target.differs_from(&stored.listing_state()).then(|| VehicleUpdate {
                    id: stored.id,
                    patch: VehiclePatch::from_state(&target),
                })
            })
            .collect();

        if !updates.is_empty() {
            let ids: Vec<Uuid> = updates.iter().map(|update| update.id).collect();
            match self.vehicle_repository.bulk_update(updates).await {
                Ok(outcome) => {
                    report.updated = outcome.applied;
                    report.failed = outcome.failed;
                }
                Err(err) => {
                    let reason = err.to_string();
                    report.failed = ids.into_iter().map(|id| (id, reason.clone())).collect();
                }
            }
            for (vehicle_id, reason) in &report.failed {
                warn!(vehicle_id = %vehicle_id, reason = %reason, "Failed to persist listing state");
            }
        }

        let mut published: Vec<Vehicle> =
            working.into_iter().filter(|vehicle| vehicle.is_published()).collect();
        published.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        report.published = published;

        info!(
            scope = %scope,
            candidates = report.candidates,
            orphaned = report.orphaned,
            updated = report.updated,
            failed = report.failed.len(),
            suspended = report.suspended,
            reinstated = report.reinstated,
            "Reconciliation pass finished"
        );

        Ok(report)
    }

    /// One batched fetch for every distinct seller referenced
    async fn load_sellers(&self, candidates: &[Vehicle]) -> HashMap<String, Seller> {
        let mut seen = HashSet::new();
        let emails: Vec<String> = candidates
            .iter()
            .filter(|vehicle| seen.insert(vehicle.seller_email.as_str()))
            .map(|vehicle| vehicle.seller_email.clone())
            .collect();
        if emails.is_empty() {
            return HashMap::new();
        }

        match self.seller_repository.find_by_emails(&emails).await {
            Ok(sellers) => sellers
                .into_iter()
                .map(|seller| (seller.email.clone(), seller))
                .collect(),
            Err(err) => {
                warn!(
                    error = %err,
                    sellers = emails.len(),
                    "Seller lookup failed, leaving listings untouched"
                );
                HashMap::new()
            }
        }
    }

    /// Enforce each seller's listing limit on the projected states.
    ///
    /// Suspended listings still inside their expiry compete for the cap
    /// alongside published ones, so freed capacity reinstates them.
    fn apply_caps(
        &self,
        working: &mut [Vehicle],
        sellers: &HashMap<String, Seller>,
        now: DateTime<Utc>,
        report: &mut ReconcileReport,
    ) {
        let mut by_seller: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, vehicle) in working.iter().enumerate() {
            by_seller
                .entry(vehicle.seller_email.clone())
                .or_default()
                .push(index);
        }

        for (email, indices) in by_seller {
            let Some(seller) = sellers.get(&email) else {
                continue;
            };
            let plan_expired = is_plan_expired(seller, now);
            let limit = self.catalog.plan_details(&seller.subscription_plan).listing_limit;

            let pool: Vec<usize> = indices
                .into_iter()
                .filter(|&index| {
                    let vehicle = &working[index];
                    vehicle.is_published() || (!plan_expired && vehicle.is_reinstatable(now))
                })
                .collect();
            let over_cap = {
                let refs: Vec<&Vehicle> = pool.iter().map(|&index| &working[index]).collect();
                cap_decision(&refs, limit)
            };

            for index in pool {
                let vehicle = &mut working[index];
                let was_suspended = vehicle.listing_status == ListingStatus::Suspended;

                if over_cap.contains(&vehicle.id) {
                    if !was_suspended {
                        let mut state = vehicle.listing_state();
                        state.mark_suspended();
                        vehicle.set_listing_state(&state);
                        report.suspended += 1;
                        debug!(
                            vehicle_id = %vehicle.id,
                            seller = %email,
                            limit = %limit,
                            "Suspending listing over plan limit"
                        );
                    }
                } else if was_suspended && vehicle.status == VehicleStatus::Unpublished {
                    let mut state = vehicle.listing_state();
                    state.mark_active();
                    vehicle.set_listing_state(&state);
                    let state = evaluate_listing_state(vehicle, seller, now);
                    vehicle.set_listing_state(&state);
                    report.reinstated += 1;
                    debug!(vehicle_id = %vehicle.id, seller = %email, "Reinstating suspended listing");
                }
            }
        }
    }
}
