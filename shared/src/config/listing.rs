//! Listing lifecycle configuration

use serde::{Deserialize, Serialize};

/// Tuning for reconciliation, the credit ledger and the listing view cache
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListingConfig {
    /// Compare-and-set attempts before a ledger operation reports a conflict
    #[serde(default = "default_ledger_max_attempts")]
    pub ledger_max_attempts: u32,

    /// TTL of a cached published-listing view, in seconds
    #[serde(default = "default_view_cache_ttl")]
    pub view_cache_ttl_seconds: u64,

    /// Serve published listings from the view cache when possible
    #[serde(default = "default_view_cache_enabled")]
    pub view_cache_enabled: bool,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            ledger_max_attempts: default_ledger_max_attempts(),
            view_cache_ttl_seconds: default_view_cache_ttl(),
            view_cache_enabled: default_view_cache_enabled(),
        }
    }
}

impl ListingConfig {
    /// Attempts clamped to at least one
    pub fn ledger_attempts(&self) -> u32 {
        self.ledger_max_attempts.max(1)
    }
}

fn default_ledger_max_attempts() -> u32 {
    3
}

fn default_view_cache_ttl() -> u64 {
    30
}

fn default_view_cache_enabled() -> bool {
    true
}
