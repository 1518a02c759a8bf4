use async_trait::async_trait;

use crate::domain::entities::Vehicle;

/// Short-lived cache of the published listing view.
///
/// Never a source of truth: a failed read is treated as a miss and the view
/// is dropped after every vehicle write.
#[async_trait]
pub trait ListingViewCache: Send + Sync {
    /// Cached published view, if present
    async fn get_published(&self) -> Result<Option<Vec<Vehicle>>, String>;
    /// Store the published view for `ttl_seconds`
    async fn put_published(&self, listings: &[Vehicle], ttl_seconds: u64) -> Result<(), String>;
    /// Drop the cached view
    async fn invalidate(&self) -> Result<(), String>;
}

/// Cache that stores nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpListingViewCache;

#[async_trait]
impl ListingViewCache for NoOpListingViewCache {
    async fn get_published(&self) -> Result<Option<Vec<Vehicle>>, String> {
        Ok(None)
    }

    async fn put_published(&self, _listings: &[Vehicle], _ttl_seconds: u64) -> Result<(), String> {
        Ok(())
    }

    async fn invalidate(&self) -> Result<(), String> {
        Ok(())
    }
}
