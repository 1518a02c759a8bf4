//! Cache module for Redis-based caching
//!
//! Only derived, disposable data lives here: the published listing view.

pub mod listing_view_cache;
pub mod redis_client;

pub use listing_view_cache::RedisListingViewCache;
pub use redis_client::RedisClient;
