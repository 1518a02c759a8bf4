//! The authenticated caller of a listing action.

use serde::{Deserialize, Serialize};

use crate::domain::entities::Vehicle;

/// Who is performing an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Normalized email of the caller
    pub email: String,
    /// Admins may act on any seller's listings
    pub is_admin: bool,
}

impl Actor {
    pub fn seller(email: &str) -> Self {
        Self {
            email: al_shared::validation::normalize_email(email),
            is_admin: false,
        }
    }

    pub fn admin(email: &str) -> Self {
        Self {
            email: al_shared::validation::normalize_email(email),
            is_admin: true,
        }
    }

    /// Owner or admin
    pub fn can_act_for(&self, seller_email: &str) -> bool {
        self.is_admin || self.email == al_shared::validation::normalize_email(seller_email)
    }

    pub fn can_manage(&self, vehicle: &Vehicle) -> bool {
        self.can_act_for(&vehicle.seller_email)
    }
}
