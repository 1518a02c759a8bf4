//! Scheduled listing sweep.
//!
//! Runs one reconciliation pass over every published listing, or over a
//! single seller when an email is given as the first argument:
//!
//! ```text
//! reconcile
//! reconcile dealer@cars.example
//! ```

use std::sync::Arc;

use al_core::services::{
    ListingReconciler, ListingViewCache, PlanCatalog, ReconcileReport, ReconcileScope,
    StaticPlanCatalog,
};
use al_infra::cache::{RedisClient, RedisListingViewCache};
use al_infra::database::{DatabasePool, MySqlSellerRepository, MySqlVehicleRepository};
use al_infra::{settings, telemetry};
use anyhow::Context;
use chrono::Utc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = settings::load().context("loading configuration")?;
    telemetry::init_tracing(&config.logging).context("initialising tracing")?;

    let scope = match std::env::args().nth(1) {
        Some(email) => ReconcileScope::Seller(al_shared::validation::normalize_email(&email)),
        None => ReconcileScope::AllPublished,
    };
    info!(environment = %config.environment, scope = %scope, "Starting reconciliation");

    let pool = DatabasePool::new(config.database.clone())
        .await
        .context("connecting to MySQL")?;
    let sellers = Arc::new(MySqlSellerRepository::new(pool.get_pool().clone()));
    let vehicles = Arc::new(MySqlVehicleRepository::new(pool.get_pool().clone()));
    let catalog: Arc<dyn PlanCatalog> =
        Arc::new(StaticPlanCatalog::from_config(config.plans.clone()));

    let reconciler = ListingReconciler::new(sellers, vehicles, catalog);
    let report = reconciler
        .reconcile(scope, Utc::now())
        .await
        .context("running reconciliation")?;

    log_report(&report);

    if report.updated > 0 && config.listing.view_cache_enabled {
        drop_cached_view(&config.cache).await;
    }

    pool.close().await;

    if !report.failed.is_empty() {
        anyhow::bail!("{} listing update(s) failed", report.failed.len());
    }
    Ok(())
}

fn log_report(report: &ReconcileReport) {
    for (vehicle_id, reason) in &report.failed {
        warn!(%vehicle_id, reason = %reason, "Listing left unreconciled");
    }
    info!(
        candidates = report.candidates,
        updated = report.updated,
        suspended = report.suspended,
        reinstated = report.reinstated,
        orphaned = report.orphaned,
        failed = report.failed.len(),
        published = report.published.len(),
        "Reconciliation finished"
    );
}

/// Listings changed under the cached view; a stale view expires on its own
/// if Redis cannot be reached.
async fn drop_cached_view(cache_config: &al_shared::config::CacheConfig) {
    let cache = match RedisClient::new(cache_config.clone()).await {
        Ok(client) => RedisListingViewCache::new(client),
        Err(e) => {
            warn!(error = %e, "Redis unavailable, cached view left to expire");
            return;
        }
    };
    if let Err(e) = cache.invalidate().await {
        warn!(error = %e, "Failed to drop cached listing view");
    }
}
