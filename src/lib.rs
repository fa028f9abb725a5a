//! Tokeninfo Proxy - A caching reverse proxy for OAuth2 token introspection
//!
//! Forwards `access_token` lookups to an upstream tokeninfo endpoint and
//! caches its verdicts with TTL expiration and LRU eviction.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;
pub mod upstream;

pub use api::{create_router, AppState};
pub use cache::ResponseCache;
pub use config::Config;
pub use error::{ConfigError, ProxyError};
pub use tasks::spawn_cleanup_task;
pub use upstream::{UpstreamClient, UpstreamTarget};
