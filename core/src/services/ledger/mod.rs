//! Credit ledger
//!
//! Guards the two per-seller quotas: certification requests and featured
//! credits. The vehicle flag is claimed with a conditional update before the
//! seller counter is consumed through a versioned compare-and-set, so two
//! concurrent requests can never both spend the last unit.

mod config;
mod receipt;
mod service;

#[cfg(test)]
mod tests;

pub use config::CreditLedgerConfig;
pub use receipt::{CertificationReceipt, FeatureReceipt};
pub use service::CreditLedger;
