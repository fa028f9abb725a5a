//! API Routes
//!
//! Configures the Axum router for the tokeninfo proxy.

use axum::{extract::Request, routing::get, Router};
use tower_http::trace::TraceLayer;

use super::handlers::{tokeninfo_handler, AppState};

/// Creates the main router.
///
/// The tokeninfo handler answers `GET` on every path, since only the query
/// string matters. Other methods are rejected with 405. Every request is
/// traced.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(tokeninfo_handler))
        .route("/*path", get(tokeninfo_handler))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .with_state(state)
}

/// The query carries the access token, so only the path is recorded.
fn request_span(request: &Request) -> tracing::Span {
    tracing::debug_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
    )
}
