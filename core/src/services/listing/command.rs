use serde::{Deserialize, Serialize};

use crate::domain::entities::Vehicle;
use crate::errors::ValidationError;
use crate::services::ledger::{CertificationReceipt, FeatureReceipt};

/// Every action a seller can take on an existing listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ListingCommand {
    Feature,
    Certify,
    Boost {
        #[serde(rename = "packageId")]
        package_id: String,
    },
    Sold,
    Unsold,
    Refresh,
    Renew,
}

impl ListingCommand {
    /// Build a command from a raw action name.
    ///
    /// `boost` needs a package id; unknown names are rejected.
    pub fn parse(action: &str, package_id: Option<&str>) -> Result<Self, ValidationError> {
        match action.trim().to_lowercase().as_str() {
            "feature" => Ok(ListingCommand::Feature),
            "certify" => Ok(ListingCommand::Certify),
            "boost" => match package_id.map(str::trim).filter(|id| !id.is_empty()) {
                Some(package_id) => Ok(ListingCommand::Boost {
                    package_id: package_id.to_string(),
                }),
                None => Err(ValidationError::RequiredField {
                    field: "packageId".to_string(),
                }),
            },
            "sold" => Ok(ListingCommand::Sold),
            "unsold" => Ok(ListingCommand::Unsold),
            "refresh" => Ok(ListingCommand::Refresh),
            "renew" => Ok(ListingCommand::Renew),
            _ => Err(ValidationError::UnknownAction {
                action: action.to_string(),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ListingCommand::Feature => "feature",
            ListingCommand::Certify => "certify",
            ListingCommand::Boost { .. } => "boost",
            ListingCommand::Sold => "sold",
            ListingCommand::Unsold => "unsold",
            ListingCommand::Refresh => "refresh",
            ListingCommand::Renew => "renew",
        }
    }
}

/// Result of [`ListingCommand`] execution
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ActionOutcome {
    Featured(FeatureReceipt),
    Certified(CertificationReceipt),
    Updated(Vehicle),
}

impl ActionOutcome {
    /// The vehicle as persisted after the action
    pub fn vehicle(&self) -> &Vehicle {
        match self {
            ActionOutcome::Featured(receipt) => &receipt.vehicle,
            ActionOutcome::Certified(receipt) => &receipt.vehicle,
            ActionOutcome::Updated(vehicle) => vehicle,
        }
    }
}
