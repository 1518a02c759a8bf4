//! Unit tests for error codes and response conversion

use al_shared::errors::{ErrorResponse, IntoErrorResponse};
use validator::Validate;

use crate::domain::entities::ListingDraft;
use crate::errors::{DomainError, EntitlementError, ValidationError};

#[test]
fn test_entitlement_errors_are_user_facing() {
    let err: DomainError = EntitlementError::CreditsExhausted.into();
    assert!(err.is_user_facing());
    assert_eq!(err.code(), "CREDITS_EXHAUSTED");

    let err = DomainError::unavailable("connection refused");
    assert!(!err.is_user_facing());
    assert_eq!(err.code(), "SERVICE_UNAVAILABLE");
}

#[test]
fn test_error_response_hides_infrastructure_details() {
    let response = DomainError::unavailable("mysql://secret-host refused").to_error_response();
    assert_eq!(response.error, "SERVICE_UNAVAILABLE");
    assert!(!response.message.contains("secret-host"));
}

#[test]
fn test_limit_reached_carries_limit_detail() {
    let err = DomainError::from(EntitlementError::LimitReached { limit: 10 });
    let response = err.to_error_response();
    assert_eq!(response.error, "LIMIT_REACHED");
    assert_eq!(response.details.unwrap()["limit"], 10);
}

#[test]
fn test_plan_ineligible_message() {
    let err = EntitlementError::PlanIneligible {
        feature: "certification".to_string(),
    };
    assert_eq!(err.to_string(), "Current plan does not include certification");

    let response: ErrorResponse = err.into();
    assert_eq!(response.error, "PLAN_INELIGIBLE");
}

#[test]
fn test_unknown_action_maps_to_validation() {
    let err: DomainError = ValidationError::UnknownAction {
        action: "teleport".to_string(),
    }
    .into();
    assert_eq!(err.code(), "VALIDATION_ERROR");
    assert!(err.to_string().contains("teleport"));
}

#[test]
fn test_rule_and_email_errors_map_to_validation() {
    let err = DomainError::BusinessRule {
        message: "Only sold listings can be returned to the market".to_string(),
    };
    assert!(err.is_user_facing());
    assert_eq!(err.code(), "VALIDATION_ERROR");

    let err: DomainError = ValidationError::InvalidEmail.into();
    assert_eq!(err.code(), "VALIDATION_ERROR");
}

#[test]
fn test_validator_errors_list_fields() {
    let draft = ListingDraft {
        make: String::new(),
        model: "Civic".to_string(),
        year: 3000,
        price: 0,
        mileage: None,
        description: None,
    };
    let err: DomainError = draft.validate().unwrap_err().into();
    match err {
        DomainError::Validation { message } => {
            assert_eq!(message, "Invalid fields: make, price, year");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}
