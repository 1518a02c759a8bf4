//! # Infrastructure Layer
//!
//! Concrete adapters for the Autolot listing engine:
//!
//! - **Database**: MySQL seller and vehicle repositories over SQLx
//! - **Cache**: Redis-backed listing view cache
//! - **Settings**: layered configuration loading
//! - **Telemetry**: tracing subscriber initialisation
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)
//! - `redis-cache`: Enable Redis caching support (default)

use al_core::errors::DomainError;

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// Cache module - Redis client and listing view cache
#[cfg(feature = "redis-cache")]
pub mod cache;

pub mod settings;
pub mod telemetry;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Stored data that does not map onto the domain model
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        match err {
            InfrastructureError::Serialization(e) => DomainError::Internal {
                message: format!("Corrupt stored record: {}", e),
            },
            other => DomainError::unavailable(other.to_string()),
        }
    }
}
