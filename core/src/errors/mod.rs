//! Domain-specific error types and error handling.

mod types;

#[cfg(test)]
mod tests;

// Re-export all error types and utilities
pub use types::{EntitlementError, ValidationError};

use al_shared::errors::{error_codes, ErrorResponse, IntoErrorResponse};
use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Business rule violation: {message}")]
    BusinessRule { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Unauthorized access")]
    Unauthorized,

    /// Optimistic concurrency retries ran out
    #[error("Concurrent update conflict: {message}")]
    Conflict { message: String },

    /// The backing store could not be reached
    #[error("Service temporarily unavailable: {message}")]
    Unavailable { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Entitlement(#[from] EntitlementError),

    #[error(transparent)]
    ValidationErr(#[from] ValidationError),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        DomainError::NotFound {
            resource: resource.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        DomainError::Unavailable {
            message: message.into(),
        }
    }

    /// Recoverable conditions reported to the caller as-is.
    ///
    /// Everything else is an infrastructure or programming fault.
    pub fn is_user_facing(&self) -> bool {
        !matches!(
            self,
            DomainError::Unavailable { .. } | DomainError::Internal { .. }
        )
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::Validation { .. } | DomainError::ValidationErr(_) => {
                error_codes::VALIDATION_ERROR
            }
            DomainError::BusinessRule { .. } => error_codes::VALIDATION_ERROR,
            DomainError::NotFound { .. } => error_codes::NOT_FOUND,
            DomainError::Unauthorized => error_codes::UNAUTHORIZED,
            DomainError::Conflict { .. } => error_codes::CONFLICT,
            DomainError::Unavailable { .. } => error_codes::SERVICE_UNAVAILABLE,
            DomainError::Internal { .. } => error_codes::INTERNAL_ERROR,
            DomainError::Entitlement(err) => err.code(),
        }
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<&str> = errors.field_errors().keys().copied().collect();
        fields.sort_unstable();
        DomainError::Validation {
            message: format!("Invalid fields: {}", fields.join(", ")),
        }
    }
}

impl IntoErrorResponse for DomainError {
    fn to_error_response(&self) -> ErrorResponse {
        // Infrastructure details stay in the logs.
        let message = match self {
            DomainError::Unavailable { .. } => "Service temporarily unavailable".to_string(),
            DomainError::Internal { .. } => "Internal server error".to_string(),
            other => other.to_string(),
        };
        let response = ErrorResponse::new(self.code(), message);

        match self {
            DomainError::Entitlement(EntitlementError::LimitReached { limit }) => {
                response.add_detail("limit", limit)
            }
            DomainError::Entitlement(EntitlementError::QuotaExhausted { allowed }) => {
                response.add_detail("allowed", allowed)
            }
            DomainError::Entitlement(EntitlementError::PlanIneligible { feature }) => {
                response.add_detail("feature", feature)
            }
            _ => response,
        }
    }
}
