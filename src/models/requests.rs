//! Request model for the tokeninfo endpoint
//!
//! Extracts and validates the `access_token` query parameter.

use axum::{extract::Query, http::Uri};

use crate::error::{ProxyError, Result};

/// Name of the query parameter carrying the token
pub const ACCESS_TOKEN_PARAM: &str = "access_token";

/// Query parameters of an inbound tokeninfo request.
///
/// Only `access_token` is inspected. When the parameter is repeated, the
/// first occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenQuery {
    /// The raw token, after standard query-string decoding
    pub access_token: Option<String>,
}

impl TokenQuery {
    /// Parses the query string of `uri`.
    ///
    /// A query string that cannot be decoded is treated like one without a
    /// token, so it is rejected by [`TokenQuery::validate`].
    pub fn from_uri(uri: &Uri) -> Self {
        let access_token = Query::<Vec<(String, String)>>::try_from_uri(uri)
            .ok()
            .and_then(|Query(pairs)| {
                pairs
                    .into_iter()
                    .find(|(name, _)| name == ACCESS_TOKEN_PARAM)
                    .map(|(_, value)| value)
            });

        Self { access_token }
    }

    /// Returns the token, or [`ProxyError::InvalidRequest`] when it is absent
    /// or empty. The value is returned unchanged (no trimming).
    pub fn validate(self) -> Result<String> {
        match self.access_token {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(ProxyError::InvalidRequest),
        }
    }
}

/// Extracts a valid access token from the inbound request URI.
pub fn extract_access_token(uri: &Uri) -> Result<String> {
    TokenQuery::from_uri(uri).validate()
}
