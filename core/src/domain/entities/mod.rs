//! Domain entities representing core business objects.

pub mod plan;
pub mod seller;
pub mod vehicle;

// Re-export commonly used types
pub use plan::{ListingLimit, PlanDetails};
pub use seller::{PlanKey, Seller, SellerPatch};
pub use vehicle::{
    Boost, BoostPackage, CertificationStatus, ListingDraft, ListingStatus, Vehicle,
    VehiclePatch, VehicleStatus, DEFAULT_BOOST_DAYS, MAX_BOOST_DAYS,
};
