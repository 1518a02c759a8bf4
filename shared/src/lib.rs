//! Shared utilities and common types for the Autolot server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types
//! - Error response structures
//! - Utility functions (email validation, etc.)

pub mod config;
pub mod errors;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, DatabaseConfig, Environment, ListingConfig, LoggingConfig,
    PlanCatalogConfig, PlanLimitConfig,
};
pub use errors::{error_codes, ErrorResponse, IntoErrorResponse};
pub use utils::validation;
