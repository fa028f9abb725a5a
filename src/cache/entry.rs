//! Cache Entry Module
//!
//! Defines the upstream response snapshot stored per token, and the entry
//! wrapping it with an expiry deadline.

use std::time::Duration;

use axum::http::{HeaderValue, StatusCode};
use bytes::Bytes;
use tokio::time::Instant;

// == Cached Response ==
/// An upstream tokeninfo verdict, replayed verbatim on cache hits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    /// Upstream HTTP status code
    pub status: StatusCode,
    /// Upstream `Content-Type`, if it sent one
    pub content_type: Option<HeaderValue>,
    /// Raw upstream body
    pub body: Bytes,
}

impl CachedResponse {
    /// Creates a new cached response snapshot.
    pub fn new(status: StatusCode, content_type: Option<HeaderValue>, body: Bytes) -> Self {
        Self {
            status,
            content_type,
            body,
        }
    }
}

// == Cache Entry ==
/// A cached response plus the instant after which it must be treated as absent.
///
/// The token itself is the key of the owning map and is not repeated here.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored upstream response
    pub response: CachedResponse,
    /// Expiration deadline, None when `now + ttl` is not representable
    pub expires_at: Option<Instant>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry expiring `ttl` from now.
    pub fn new(response: CachedResponse, ttl: Duration) -> Self {
        Self {
            response,
            expires_at: Instant::now().checked_add(ttl),
        }
    }

    // == Is Expired ==
    /// Checks whether the entry has expired at `now`.
    ///
    /// An entry is visible only while `now < expires_at`; at the deadline
    /// itself it is already expired.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }
}
