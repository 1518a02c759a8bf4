//! Entitlement engine
//!
//! Pure functions deciding listing expiry, plan lapse, per-seller caps and
//! remaining quotas. Nothing here performs I/O; `now` is always passed in.

mod engine;

#[cfg(test)]
mod tests;

pub use engine::{
    cap_decision, check_listing_capacity, compute_listing_expiry, evaluate_listing_state,
    is_plan_expired, remaining_certifications, remaining_featured_credits,
    LISTING_DURATION_DAYS,
};
