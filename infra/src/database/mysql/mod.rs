//! MySQL implementations of the core repository traits.

mod seller_repository_impl;
mod vehicle_repository_impl;

pub use seller_repository_impl::MySqlSellerRepository;
pub use vehicle_repository_impl::MySqlVehicleRepository;

use al_core::errors::DomainError;

use crate::InfrastructureError;

/// Query failures surface as `Unavailable`
pub(crate) fn query_error(err: sqlx::Error) -> DomainError {
    InfrastructureError::Database(err).into()
}

/// A column that could not be read or decoded
pub(crate) fn column_error(column: &str, err: impl std::fmt::Display) -> DomainError {
    DomainError::Internal {
        message: format!("Failed to get {}: {}", column, err),
    }
}
