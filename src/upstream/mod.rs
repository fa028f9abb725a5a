//! Upstream Module
//!
//! The configured tokeninfo backend and the HTTP client that calls it.

mod client;
mod target;

pub use client::UpstreamClient;
pub use target::UpstreamTarget;
