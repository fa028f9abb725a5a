//! API Module
//!
//! HTTP handler and routing for the tokeninfo proxy.
//!
//! # Endpoints
//! - `GET /<any path>?access_token=...` - Token introspection, cached

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
