//! # Autolot Core
//!
//! Listing lifecycle and entitlement rules for the Autolot vehicle
//! marketplace: domain entities, repository interfaces, the entitlement
//! engine, reconciliation, the credit ledger and the listing action handlers.
//! Persistence lives behind the repository traits and is provided by
//! `al_infra`.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::{
    BulkUpdateOutcome, MockSellerRepository, MockVehicleRepository, SellerRepository,
    VehicleCondition, VehicleRepository, VehicleUpdate,
};
pub use services::*;
