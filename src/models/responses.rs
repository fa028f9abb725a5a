//! Response DTOs for the tokeninfo proxy
//!
//! Successful responses are the upstream payload replayed verbatim; the only
//! body this crate produces itself is the OAuth2-style error document.

use serde::Serialize;

/// OAuth2 error code for a missing or empty token
pub const INVALID_REQUEST: &str = "invalid_request";

/// Description sent alongside [`INVALID_REQUEST`]
pub const INVALID_TOKEN_DESCRIPTION: &str = "Access Token not valid";

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub error: String,
    /// Human-readable description
    pub error_description: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            error_description: description.into(),
        }
    }

    /// The fixed body for rejected tokeninfo requests
    pub fn invalid_request() -> Self {
        Self::new(INVALID_REQUEST, INVALID_TOKEN_DESCRIPTION)
    }

    /// Serializes to compact JSON terminated by a newline.
    pub fn to_json_line(&self) -> Vec<u8> {
        // Two plain string fields cannot fail to serialize.
        let mut body = serde_json::to_vec(self).unwrap_or_default();
        body.push(b'\n');
        body
    }
}
