//! Business services containing domain logic and use cases.

pub mod catalog;
pub mod entitlement;
pub mod ledger;
pub mod listing;
pub mod reconciler;

#[cfg(test)]
pub(crate) mod test_fixtures;

// Re-export commonly used types
pub use catalog::{PlanCatalog, StaticPlanCatalog};
pub use ledger::{CertificationReceipt, CreditLedger, CreditLedgerConfig, FeatureReceipt};
pub use listing::{
    ActionOutcome, ListingCommand, ListingService, ListingViewCache, NoOpListingViewCache,
    PlanChange,
};
pub use reconciler::{ListingReconciler, ReconcileReport, ReconcileScope};
