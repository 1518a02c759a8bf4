pub mod seller;
pub mod vehicle;

pub use seller::{MockSellerRepository, SellerRepository};
pub use vehicle::{
    BulkUpdateOutcome, MockVehicleRepository, VehicleCondition, VehicleRepository, VehicleUpdate,
};
