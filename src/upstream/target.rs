//! Upstream Target
//!
//! The fixed base URL of the tokeninfo backend. Outbound requests always use
//! its scheme, authority and path; only the query string comes from the
//! inbound request.

use std::fmt;

use reqwest::Url;

use crate::error::ConfigError;

/// Validated upstream base URL, immutable for the proxy's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamTarget {
    url: Url,
}

impl UpstreamTarget {
    /// Parses and validates an upstream URL such as
    /// `https://auth.example.org/oauth2/tokeninfo`.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUpstreamUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;
        Self::from_url(url)
    }

    /// Validates an already parsed URL: it must be http(s) with a host.
    pub fn from_url(url: Url) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidUpstreamUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        };

        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(invalid("missing host"));
        }

        Ok(Self { url })
    }

    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// Host name or IP literal (IPv6 literals keep their brackets).
    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    /// Explicit port, None when the scheme's default is used.
    pub fn port(&self) -> Option<u16> {
        self.url.port()
    }

    /// Fixed path called on the backend; `/` when the URL has none.
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Value for the outbound `Host` header.
    pub fn host_header(&self) -> String {
        match self.port() {
            Some(port) => format!("{}:{}", self.host(), port),
            None => self.host().to_string(),
        }
    }

    /// Builds the outbound URL: the target's scheme, authority and path with
    /// `raw_query` passed through. Any query or fragment on the configured
    /// URL is replaced.
    ///
    /// The query goes through WHATWG URL serialization, which keeps existing
    /// percent escapes but encodes a bare `'` as `%27`. Form decoding treats
    /// both spellings the same.
    pub fn request_url(&self, raw_query: Option<&str>) -> Url {
        let mut url = self.url.clone();
        url.set_fragment(None);
        url.set_query(raw_query.filter(|query| !query.is_empty()));
        url
    }
}

impl fmt::Display for UpstreamTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}{}", self.scheme(), self.host_header(), self.path())
    }
}
