//! Configuration for the credit ledger

use al_shared::config::ListingConfig;

#[derive(Debug, Clone)]
pub struct CreditLedgerConfig {
    /// Compare-and-set attempts before giving up with a conflict
    pub max_attempts: u32,
}

impl Default for CreditLedgerConfig {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

impl From<&ListingConfig> for CreditLedgerConfig {
    fn from(config: &ListingConfig) -> Self {
        Self {
            max_attempts: config.ledger_attempts(),
        }
    }
}
