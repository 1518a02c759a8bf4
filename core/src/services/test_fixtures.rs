//! Builders shared by the service test suites

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::domain::entities::{ListingDraft, PlanKey, Seller, Vehicle};

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

pub fn draft() -> ListingDraft {
    ListingDraft {
        make: "Subaru".to_string(),
        model: "Outback".to_string(),
        year: 2019,
        price: 2_450_000,
        mileage: Some(61_000),
        description: Some("One owner, full service history".to_string()),
    }
}

/// Published listing with no expiry, created `age_days` before [`fixed_now`]
pub fn listing(seller: &str, age_days: i64) -> Vehicle {
    Vehicle::publish(draft(), seller, None, fixed_now() - Duration::days(age_days))
}

pub fn seller(email: &str, plan: PlanKey) -> Seller {
    Seller::new(email, plan)
}
