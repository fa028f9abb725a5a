//! Error types for the tokeninfo proxy
//!
//! Provides unified error handling using thiserror. Every request-path error
//! is translated into an HTTP response; nothing here can crash the server.

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Proxy Error Enum ==
/// Errors produced while serving a tokeninfo request.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// The `access_token` query parameter is missing or empty
    #[error("Access Token not valid")]
    InvalidRequest,

    /// Upstream did not answer within the configured deadline
    #[error("Upstream did not respond within {0:?}")]
    UpstreamTimeout(Duration),

    /// Transport-level failure talking to upstream (refused, DNS, truncated body)
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),
}

// == Config Error Enum ==
/// Errors detected while building the proxy from its configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Upstream URL could not be parsed
    #[error("Invalid upstream URL '{url}': {reason}")]
    InvalidUpstreamUrl { url: String, reason: String },

    /// Upstream timeout of zero would fail every request
    #[error("Upstream timeout must be greater than zero")]
    ZeroUpstreamTimeout,

    /// The outbound HTTP client could not be built
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

// == IntoResponse Implementation ==
impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ProxyError::InvalidRequest => {
                (StatusCode::BAD_REQUEST, ErrorResponse::invalid_request())
            }
            ProxyError::UpstreamTimeout(_) => (
                StatusCode::GATEWAY_TIMEOUT,
                ErrorResponse::new("upstream_timeout", self.to_string()),
            ),
            ProxyError::UpstreamUnavailable(_) => (
                StatusCode::BAD_GATEWAY,
                ErrorResponse::new("upstream_unavailable", self.to_string()),
            ),
        };

        let mut response = (status, body.to_json_line()).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        response
    }
}

// == Result Type Alias ==
/// Convenience Result type for the request path.
pub type Result<T> = std::result::Result<T, ProxyError>;
