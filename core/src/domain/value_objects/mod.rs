//! Value objects representing immutable domain concepts.

pub mod actor;
pub mod listing_state;

// Re-export commonly used types
pub use actor::Actor;
pub use listing_state::{expiry_differs, ListingState, EXPIRY_TOLERANCE_MILLIS};
