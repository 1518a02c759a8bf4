use serde::Serialize;
use std::fmt;
use uuid::Uuid;

use crate::domain::entities::Vehicle;

/// Which listings a pass looks at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileScope {
    /// Every published listing (read path and scheduled sweep)
    AllPublished,
    /// Every unsold listing of one seller, suspended ones included
    Seller(String),
}

impl fmt::Display for ReconcileScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileScope::AllPublished => f.write_str("all_published"),
            ReconcileScope::Seller(email) => write!(f, "seller:{}", email),
        }
    }
}

/// Outcome of one reconciliation pass
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    /// Listings considered
    pub candidates: usize,
    /// Listings whose seller was found and that were evaluated
    pub evaluated: usize,
    /// Listings skipped because their seller is unknown
    pub orphaned: usize,
    /// Writes that succeeded
    pub updated: usize,
    /// Listings newly suspended by the cap
    pub suspended: usize,
    /// Suspended listings put back on the market
    pub reinstated: usize,
    /// Writes that failed, with the reason
    pub failed: Vec<(Uuid, String)>,
    /// Published listings after the pass, newest first
    pub published: Vec<Vehicle>,
}

impl ReconcileReport {
    /// Writes the pass attempted
    pub fn attempted_writes(&self) -> usize {
        self.updated + self.failed.len()
    }
}
