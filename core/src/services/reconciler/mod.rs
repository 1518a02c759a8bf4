//! Listing reconciler
//!
//! Applies the entitlement engine to a candidate set of listings and commits
//! only the records whose state actually changes.

mod report;
mod service;

#[cfg(test)]
mod tests;

pub use report::{ReconcileReport, ReconcileScope};
pub use service::ListingReconciler;
