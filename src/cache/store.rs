//! Cache Store Module
//!
//! The shared tokeninfo response cache: a HashMap of entries plus LRU
//! tracking, guarded by a single mutex that is never held across an await.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::cache::{CacheEntry, CacheStats, CachedResponse, LruTracker};

// == Cache State ==
/// Everything behind the lock.
#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    lru: LruTracker,
    stats: CacheStats,
}

impl CacheState {
    fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        self.lru.remove(key);
        self.entries.remove(key)
    }
}

// == Response Cache ==
/// Capacity- and TTL-bounded cache mapping access tokens to upstream responses.
///
/// A cache built with zero capacity or zero TTL is disabled for its whole
/// lifetime: every lookup misses and every insert is dropped, without
/// touching the lock.
#[derive(Debug)]
pub struct ResponseCache {
    /// Computed once at construction
    enabled: bool,
    /// Maximum number of live entries
    capacity: usize,
    /// Lifetime of each entry
    ttl: Duration,
    /// Misses counted while disabled
    disabled_misses: AtomicU64,
    state: Mutex<CacheState>,
}

impl ResponseCache {
    // == Constructor ==
    /// Creates a cache holding at most `capacity` entries for `ttl` each.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            enabled: capacity > 0 && !ttl.is_zero(),
            capacity,
            ttl,
            disabled_misses: AtomicU64::new(0),
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Lookups and inserts are total, so a panic in another holder of the
    /// lock leaves the state usable.
    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // == Get ==
    /// Returns the live response cached for `token`.
    ///
    /// A hit refreshes the token's recency. An expired entry is removed and
    /// reported as a miss.
    pub fn get(&self, token: &str) -> Option<CachedResponse> {
        if !self.enabled {
            self.disabled_misses.fetch_add(1, Ordering::Relaxed);
            return None;
        }

        let mut state = self.lock();
        let now = Instant::now();
        let cached = state
            .entries
            .get(token)
            .map(|entry| (entry.is_expired_at(now), entry.response.clone()));

        match cached {
            Some((false, response)) => {
                state.lru.touch(token);
                state.stats.record_hit();
                Some(response)
            }
            Some((true, _)) => {
                state.remove(token);
                state.stats.record_expirations(1);
                state.stats.record_miss();
                None
            }
            None => {
                state.stats.record_miss();
                None
            }
        }
    }

    // == Put ==
    /// Stores `response` for `token`, expiring after the configured TTL.
    ///
    /// Overwriting an existing token keeps a single entry and resets its TTL.
    /// Inserting a new token into a full cache evicts the least recently
    /// used entry first.
    pub fn put(&self, token: &str, response: CachedResponse) {
        if !self.enabled {
            return;
        }

        let mut state = self.lock();

        if !state.entries.contains_key(token) {
            while state.entries.len() >= self.capacity {
                match state.lru.evict_oldest() {
                    Some(evicted) => {
                        if state.entries.remove(&evicted).is_some() {
                            state.stats.record_eviction();
                            debug!("Evicted least recently used token from cache");
                        }
                    }
                    None => {
                        // Tracker and map disagree; inserting is preferable
                        // to failing the request.
                        warn!(
                            entries = state.entries.len(),
                            "No eviction candidate in a full cache, skipping eviction"
                        );
                        break;
                    }
                }
            }
        }

        state
            .entries
            .insert(token.to_string(), CacheEntry::new(response, self.ttl));
        state.lru.touch(token);
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&self) -> usize {
        if !self.enabled {
            return 0;
        }

        let mut state = self.lock();
        let now = Instant::now();

        let expired: Vec<String> = state
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            state.remove(key);
        }

        state.stats.record_expirations(expired.len());
        expired.len()
    }

    // == Stats ==
    /// Returns a snapshot of the cache statistics.
    pub fn stats(&self) -> CacheStats {
        let state = self.lock();
        let mut stats = state.stats.clone();
        stats.misses += self.disabled_misses.load(Ordering::Relaxed);
        stats.set_total_entries(state.entries.len());
        stats
    }

    /// Returns the number of stored entries, expired ones included until
    /// they are looked up or swept.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }
}
