use serde::Serialize;

use crate::domain::entities::Vehicle;

/// Result of a certification request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificationReceipt {
    pub vehicle: Vehicle,
    pub used_certifications: u32,
    pub remaining_certifications: u32,
    /// The vehicle was already requested; nothing was consumed.
    ///
    /// Set from the stored record when a concurrent request won the claim.
    /// If that request later fails its quota check it releases the claim, so
    /// callers needing the settled state should re-read the vehicle.
    pub already_requested: bool,
}

/// Result of featuring a listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureReceipt {
    pub vehicle: Vehicle,
    pub remaining_credits: u32,
    /// The vehicle was already featured; nothing was consumed.
    ///
    /// Same caveat as [`CertificationReceipt::already_requested`] when a
    /// concurrent request won the claim.
    pub already_featured: bool,
}
