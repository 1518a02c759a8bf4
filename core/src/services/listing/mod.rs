//! Listing action handlers
//!
//! Thin entry points for seller and admin actions. Each one checks ownership,
//! defers entitlement decisions to the engine or the credit ledger, and
//! invalidates cached listing views after writing.

mod cache;
mod command;
mod service;

#[cfg(test)]
mod tests;

pub use cache::{ListingViewCache, NoOpListingViewCache};
pub use command::{ActionOutcome, ListingCommand};
pub use service::{ListingService, PlanChange};
