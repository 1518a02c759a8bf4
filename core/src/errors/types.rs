//! Entitlement and validation error types
//!
//! Every variant here is a recoverable, user-facing condition with a
//! stable error code.

use al_shared::errors::{error_codes, ErrorResponse};
use thiserror::Error;

/// Plan and quota violations raised by the entitlement engine and ledger
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntitlementError {
    #[error("Subscription plan has expired")]
    PlanExpired,

    #[error("Listing limit reached ({limit} active listings)")]
    LimitReached { limit: u32 },

    #[error("Current plan does not include {feature}")]
    PlanIneligible { feature: String },

    #[error("Certification quota exhausted ({allowed} included with plan)")]
    QuotaExhausted { allowed: u32 },

    #[error("No featured credits remaining")]
    CreditsExhausted,
}

impl EntitlementError {
    pub fn code(&self) -> &'static str {
        match self {
            EntitlementError::PlanExpired => error_codes::PLAN_EXPIRED,
            EntitlementError::LimitReached { .. } => error_codes::LIMIT_REACHED,
            EntitlementError::PlanIneligible { .. } => error_codes::PLAN_INELIGIBLE,
            EntitlementError::QuotaExhausted { .. } => error_codes::QUOTA_EXHAUSTED,
            EntitlementError::CreditsExhausted => error_codes::CREDITS_EXHAUSTED,
        }
    }
}

/// Input validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field: {field}")]
    RequiredField { field: String },

    #[error("Invalid format: {field}")]
    InvalidFormat { field: String },

    #[error("Unknown action: {action}")]
    UnknownAction { action: String },

    #[error("Invalid email")]
    InvalidEmail,
}

impl From<EntitlementError> for ErrorResponse {
    fn from(err: EntitlementError) -> Self {
        ErrorResponse::new(err.code(), err.to_string())
    }
}

impl From<ValidationError> for ErrorResponse {
    fn from(err: ValidationError) -> Self {
        ErrorResponse::new(error_codes::VALIDATION_ERROR, err.to_string())
    }
}
