//! Cache Module
//!
//! Provides the in-memory tokeninfo response cache with TTL expiration and
//! LRU eviction.

mod entry;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use entry::{CacheEntry, CachedResponse};
pub use lru::LruTracker;
pub use stats::CacheStats;
pub use store::ResponseCache;

// == Public Constants ==
/// Header reporting whether a response was served from the cache
pub const X_CACHE: &str = "x-cache";

/// `X-Cache` value for responses replayed from the cache
pub const CACHE_HIT: &str = "HIT";

/// `X-Cache` value for responses fetched from upstream
pub const CACHE_MISS: &str = "MISS";
