//! Redis-backed published listing view.
//!
//! The view is stored as one JSON document under `listings:published`.
//! Errors are handed back as strings; the listing service treats any of
//! them as a miss.

use async_trait::async_trait;
use tracing::debug;

use al_core::domain::entities::Vehicle;
use al_core::services::ListingViewCache;

use super::RedisClient;

const PUBLISHED_KEY: &str = "listings:published";

/// Listing view cache over [`RedisClient`]
#[derive(Clone)]
pub struct RedisListingViewCache {
    client: RedisClient,
}

impl RedisListingViewCache {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ListingViewCache for RedisListingViewCache {
    async fn get_published(&self) -> Result<Option<Vec<Vehicle>>, String> {
        let Some(raw) = self.client.get(PUBLISHED_KEY).await.map_err(|e| e.to_string())? else {
            return Ok(None);
        };

        let listings: Vec<Vehicle> = serde_json::from_str(&raw).map_err(|e| e.to_string())?;
        debug!(count = listings.len(), "Published view served from cache");
        Ok(Some(listings))
    }

    async fn put_published(&self, listings: &[Vehicle], ttl_seconds: u64) -> Result<(), String> {
        if ttl_seconds == 0 {
            return Ok(());
        }
        let raw = serde_json::to_string(listings).map_err(|e| e.to_string())?;
        self.client
            .set_with_expiry(PUBLISHED_KEY, &raw, ttl_seconds)
            .await
            .map_err(|e| e.to_string())
    }

    async fn invalidate(&self) -> Result<(), String> {
        self.client
            .delete(PUBLISHED_KEY)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use al_core::domain::entities::ListingDraft;
    use al_shared::config::CacheConfig;
    use chrono::Utc;

    #[tokio::test]
    #[ignore] // Requires a running Redis
    async fn test_published_view_round_trip_and_invalidate() {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
        let client = RedisClient::new(CacheConfig::new(url).with_prefix("autolot_view_test"))
            .await
            .unwrap();
        let cache = RedisListingViewCache::new(client);

        let draft = ListingDraft {
            make: "Mazda".to_string(),
            model: "CX-5".to_string(),
            year: 2021,
            price: 2_400_000,
            mileage: Some(31_000),
            description: None,
        };
        let listing = Vehicle::publish(draft, "dealer@cars.example", None, Utc::now());

        cache.put_published(&[listing.clone()], 30).await.unwrap();
        assert_eq!(cache.get_published().await.unwrap(), Some(vec![listing]));

        cache.invalidate().await.unwrap();
        assert_eq!(cache.get_published().await.unwrap(), None);
    }
}
