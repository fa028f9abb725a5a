//! API Handlers
//!
//! The tokeninfo handler: validate the token, answer from the cache when
//! possible, otherwise ask upstream and remember the answer.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Uri},
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::cache::{CachedResponse, ResponseCache, CACHE_HIT, CACHE_MISS, X_CACHE};
use crate::config::Config;
use crate::error::ConfigError;
use crate::models::requests::extract_access_token;
use crate::upstream::{UpstreamClient, UpstreamTarget};

/// Application state shared across all handler invocations.
///
/// Everything here is read-only after construction except the cache's
/// entries, which the cache synchronizes internally.
#[derive(Clone)]
pub struct AppState {
    /// Shared response cache
    pub cache: Arc<ResponseCache>,
    /// Client for the configured upstream
    pub upstream: UpstreamClient,
    /// Deadline for each upstream call
    pub upstream_timeout: Duration,
}

impl AppState {
    /// Creates a new AppState from its parts.
    pub fn new(cache: ResponseCache, upstream: UpstreamClient, upstream_timeout: Duration) -> Self {
        Self {
            cache: Arc::new(cache),
            upstream,
            upstream_timeout,
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;

        let target = UpstreamTarget::parse(&config.upstream_url)?;
        let upstream = UpstreamClient::new(target)?;
        let cache = ResponseCache::new(config.cache_max_entries, config.cache_ttl());

        Ok(Self::new(cache, upstream, config.upstream_timeout()))
    }
}

/// Writes a cached or freshly fetched upstream response with its `X-Cache` tag.
fn cached_response(cached: CachedResponse, cache_status: &'static str) -> Response {
    let mut response = Response::new(Body::from(cached.body));
    *response.status_mut() = cached.status;

    let headers = response.headers_mut();
    headers.insert(X_CACHE, HeaderValue::from_static(cache_status));
    if let Some(content_type) = cached.content_type {
        headers.insert(header::CONTENT_TYPE, content_type);
    }
    response
}

/// Handler for `GET /<any path>?access_token=...`
///
/// Invalid requests get a 400 without touching the cache or upstream. On a
/// cache hit the stored response is replayed with `X-Cache: HIT`. On a miss
/// upstream is called once; its response is stored and relayed with
/// `X-Cache: MISS`, while a timeout yields 504 and any other upstream
/// failure 502.
pub async fn tokeninfo_handler(State(state): State<AppState>, uri: Uri) -> Response {
    let token = match extract_access_token(&uri) {
        Ok(token) => token,
        Err(e) => {
            debug!("Rejected tokeninfo request without access token");
            return e.into_response();
        }
    };

    if let Some(cached) = state.cache.get(&token) {
        debug!(status = cached.status.as_u16(), "Tokeninfo cache hit");
        return cached_response(cached, CACHE_HIT);
    }

    // The cache lock is not held here, so a slow upstream only delays this request.
    match state.upstream.fetch(&uri, state.upstream_timeout).await {
        Ok(fetched) => {
            debug!(status = fetched.status.as_u16(), "Tokeninfo cache miss");
            state.cache.put(&token, fetched.clone());
            cached_response(fetched, CACHE_MISS)
        }
        Err(e) => e.into_response(),
    }
}
