//! Upstream Client
//!
//! Issues the tokeninfo lookup against the configured backend with a hard
//! per-request deadline. A single attempt is made; there are no retries.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, Uri};
use reqwest::{redirect, Client, Url};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::cache::CachedResponse;
use crate::error::{ConfigError, ProxyError, Result};
use crate::upstream::UpstreamTarget;

/// HTTP client bound to one upstream target.
///
/// Cheap to clone: the connection pool and the target are shared.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: Client,
    target: Arc<UpstreamTarget>,
}

impl UpstreamClient {
    /// Builds a client for `target` that relays redirects instead of
    /// following them.
    pub fn new(target: UpstreamTarget) -> std::result::Result<Self, ConfigError> {
        let http = Client::builder()
            .redirect(redirect::Policy::none())
            .build()?;
        Ok(Self::with_client(http, target))
    }

    /// Wraps an existing reqwest client.
    pub fn with_client(http: Client, target: UpstreamTarget) -> Self {
        Self {
            http,
            target: Arc::new(target),
        }
    }

    pub fn target(&self) -> &UpstreamTarget {
        &self.target
    }

    // == Fetch ==
    /// Looks up the token carried by `inbound` on the upstream.
    ///
    /// Only the inbound query string is forwarded; the inbound path and
    /// headers are discarded. The whole exchange, body included, must finish
    /// within `timeout`, otherwise the in-flight request is dropped (closing
    /// its connection) and [`ProxyError::UpstreamTimeout`] is returned.
    pub async fn fetch(&self, inbound: &Uri, timeout: Duration) -> Result<CachedResponse> {
        let url = self.target.request_url(inbound.query());
        let started = Instant::now();

        let result = match tokio::time::timeout(timeout, self.send(url)).await {
            Ok(result) => result,
            Err(_) => Err(ProxyError::UpstreamTimeout(timeout)),
        };

        match &result {
            Ok(response) => debug!(
                status = response.status.as_u16(),
                bytes = response.body.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Upstream responded"
            ),
            Err(e) => warn!(
                upstream = %self.target,
                elapsed_ms = started.elapsed().as_millis() as u64,
                error = %e,
                "Upstream call failed"
            ),
        }

        result
    }

    async fn send(&self, url: Url) -> Result<CachedResponse> {
        let response = self
            .http
            .get(url)
            .header(header::HOST, self.target.host_header())
            .send()
            .await
            .map_err(unavailable)?;

        let status = response.status();
        let content_type = response.headers().get(header::CONTENT_TYPE).cloned();
        let body = response.bytes().await.map_err(unavailable)?;

        Ok(CachedResponse::new(status, content_type, body))
    }
}

/// The request URL carries the token, so it is stripped from the message.
fn unavailable(err: reqwest::Error) -> ProxyError {
    ProxyError::UpstreamUnavailable(err.without_url().to_string())
}
