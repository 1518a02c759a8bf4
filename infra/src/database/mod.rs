//! Database module - MySQL implementations using SQLx
//!
//! Schema lives in `infra/migrations/`.

pub mod connection;
pub mod mysql;

// Re-export commonly used types
pub use connection::{DatabasePool, PoolStatistics};
pub use mysql::{MySqlSellerRepository, MySqlVehicleRepository};
