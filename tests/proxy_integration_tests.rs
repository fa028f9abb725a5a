//! Integration Tests for the tokeninfo proxy
//!
//! Drives the full router against a real in-process upstream on an
//! ephemeral port.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request, StatusCode, Uri},
    response::IntoResponse,
    Router,
};
use tokeninfo_proxy::{
    create_router, AppState, Config, ResponseCache, UpstreamClient, UpstreamTarget,
};
use tower::ServiceExt;

const TEST_TOKEN_INFO: &str = "{\"access_token\": \"xxx\",\"cn\": \"John Doe\",\"expires_in\": 42,\"grant_type\": \"password\",\"realm\":\"/services\",\"scope\":[\"uid\",\"cn\"],\"token_type\":\"Bearer\",\"uid\":\"jdoe\"}\n";

const INVALID_BODY: &str =
    "{\"error\":\"invalid_request\",\"error_description\":\"Access Token not valid\"}\n";

// == Helper Functions ==

async fn spawn_upstream(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Upstream that always answers with the fixed token info and counts calls.
async fn token_info_upstream() -> (SocketAddr, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .fallback(|State(calls): State<Arc<AtomicUsize>>| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            (
                [(header::CONTENT_TYPE, "application/json;charset=UTF-8")],
                TEST_TOKEN_INFO,
            )
        })
        .with_state(calls.clone());
    (spawn_upstream(app).await, calls)
}

fn proxy(upstream: &str, capacity: usize, ttl: Duration, timeout: Duration) -> Router {
    let target = UpstreamTarget::parse(upstream).unwrap();
    let state = AppState::new(
        ResponseCache::new(capacity, ttl),
        UpstreamClient::new(target).unwrap(),
        timeout,
    );
    create_router(state)
}

async fn call(app: &Router, uri: &str) -> (StatusCode, HeaderMap, String) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(uri)
                .header(header::HOST, "example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
}

fn x_cache(headers: &HeaderMap) -> Option<&str> {
    headers.get("x-cache").and_then(|v| v.to_str().ok())
}

// == Validation ==

#[tokio::test]
async fn test_invalid_requests_never_reach_upstream() {
    let (addr, calls) = token_info_upstream().await;
    let app = proxy(
        &format!("http://{}", addr),
        0,
        Duration::ZERO,
        Duration::from_secs(1),
    );

    for uri in [
        "http://example.com/oauth2/tokeninfo",
        "http://example.com/oauth2/tokeninfo?access_token",
        "http://example.com/oauth2/tokeninfo?access_token=",
        "http://example.com/oauth2/tokeninfo?realm=/services",
    ] {
        let (status, headers, body) = call(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body, INVALID_BODY, "{}", uri);
        assert_eq!(
            headers.get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(x_cache(&headers), None);
    }

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_proxy_passes_upstream_response_through() {
    let (addr, calls) = token_info_upstream().await;
    let app = proxy(
        &format!("http://{}", addr),
        0,
        Duration::ZERO,
        Duration::from_secs(1),
    );

    let (status, headers, body) =
        call(&app, "http://example.com/oauth2/tokeninfo?access_token=foo").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, TEST_TOKEN_INFO);
    assert_eq!(
        headers.get(header::CONTENT_TYPE).unwrap(),
        "application/json;charset=UTF-8"
    );
    assert_eq!(x_cache(&headers), Some("MISS"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_upstream_error_status_is_relayed() {
    let app = Router::new().fallback(|| async {
        (
            StatusCode::UNAUTHORIZED,
            [(header::CONTENT_TYPE, "application/json")],
            "{\"error\":\"invalid_token\"}\n",
        )
    });
    let addr = spawn_upstream(app).await;
    let app = proxy(
        &format!("http://{}", addr),
        10,
        Duration::from_secs(60),
        Duration::from_secs(1),
    );

    let (status, headers, body) = call(&app, "/oauth2/tokeninfo?access_token=revoked").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, "{\"error\":\"invalid_token\"}\n");
    assert_eq!(x_cache(&headers), Some("MISS"));

    // The upstream verdict is cached verbatim, whatever its status.
    let (status, headers, _) = call(&app, "/oauth2/tokeninfo?access_token=revoked").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(x_cache(&headers), Some("HIT"));
}

// == Host Rewrite ==

#[derive(Debug, Default)]
struct Seen {
    host: String,
    path: String,
    query: Option<String>,
}

#[tokio::test]
async fn test_host_header_and_path_are_rewritten() {
    let seen: Arc<Mutex<Vec<Seen>>> = Arc::default();
    let upstream = Router::new()
        .fallback(
            |State(seen): State<Arc<Mutex<Vec<Seen>>>>, uri: Uri, headers: HeaderMap| async move {
                seen.lock().unwrap().push(Seen {
                    host: headers
                        .get(header::HOST)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string(),
                    path: uri.path().to_string(),
                    query: uri.query().map(str::to_string),
                });
                StatusCode::OK.into_response()
            },
        )
        .with_state(seen.clone());
    let addr = spawn_upstream(upstream).await;

    let app = proxy(
        &format!("http://{}/upstream-tokeninfo", addr),
        0,
        Duration::ZERO,
        Duration::from_secs(1),
    );
    let (status, _, _) = call(
        &app,
        "http://example.com/oauth2/tokeninfo?access_token=foo",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_ne!(seen[0].host, "example.com");
    assert_eq!(seen[0].host, addr.to_string());
    assert_eq!(seen[0].path, "/upstream-tokeninfo");
    assert_eq!(seen[0].query.as_deref(), Some("access_token=foo"));
}

// == Cache ==

#[tokio::test]
async fn test_cache_hit_then_expiry() {
    let (addr, calls) = token_info_upstream().await;
    let app = proxy(
        &format!("http://{}", addr),
        10,
        Duration::from_secs(1),
        Duration::from_secs(1),
    );

    let steps = [
        ("/oauth2/tokeninfo?access_token=foo", "MISS"),
        ("/oauth2/tokeninfo?access_token=bar", "MISS"),
        ("/oauth2/tokeninfo?access_token=foo", "HIT"),
        ("/oauth2/tokeninfo?access_token=foo", "MISS"),
    ];

    for (i, (uri, want_cache)) in steps.iter().enumerate() {
        let (status, headers, body) = call(&app, uri).await;

        assert_eq!(status, StatusCode::OK, "call {}", i);
        assert_eq!(body, TEST_TOKEN_INFO, "call {}", i);
        assert_eq!(x_cache(&headers), Some(*want_cache), "call {}", i);

        if i == 2 {
            tokio::time::sleep(Duration::from_millis(1100)).await;
        }
    }

    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_cache_disabled_by_zero_ttl() {
    let (addr, calls) = token_info_upstream().await;
    let app = proxy(
        &format!("http://{}", addr),
        10,
        Duration::ZERO,
        Duration::from_secs(1),
    );

    for uri in [
        "/oauth2/tokeninfo?access_token=foo",
        "/oauth2/tokeninfo?access_token=bar",
        "/oauth2/tokeninfo?access_token=foo",
    ] {
        let (status, headers, body) = call(&app, uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, TEST_TOKEN_INFO);
        assert_eq!(x_cache(&headers), Some("MISS"));
    }

    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_cache_disabled_by_zero_capacity() {
    let (addr, calls) = token_info_upstream().await;
    let app = proxy(
        &format!("http://{}", addr),
        0,
        Duration::from_secs(60),
        Duration::from_secs(1),
    );

    for _ in 0..3 {
        let (_, headers, _) = call(&app, "/oauth2/tokeninfo?access_token=foo").await;
        assert_eq!(x_cache(&headers), Some("MISS"));
    }

    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

// == Upstream Failures ==

#[tokio::test]
async fn test_upstream_timeout_returns_gateway_timeout() {
    let upstream = Router::new().fallback(|| async {
        tokio::time::sleep(Duration::from_millis(200)).await;
        "too late"
    });
    let addr = spawn_upstream(upstream).await;
    let app = proxy(
        &format!("http://{}", addr),
        0,
        Duration::ZERO,
        Duration::from_millis(1),
    );

    let started = Instant::now();
    let (status, _, _) = call(&app, "/oauth2/tokeninfo?access_token=foo").await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert!(started.elapsed() < Duration::from_millis(200));
}

#[tokio::test]
async fn test_unreachable_upstream_returns_bad_gateway() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let app = proxy(
        &format!("http://{}", addr),
        10,
        Duration::from_secs(60),
        Duration::from_secs(1),
    );

    let (status, _, body) = call(&app, "/oauth2/tokeninfo?access_token=foo").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(!body.contains("access_token=foo"));
}

// == Construction From Config ==

#[tokio::test]
async fn test_state_from_config() {
    let (addr, calls) = token_info_upstream().await;
    let config = Config {
        upstream_url: format!("http://{}/oauth2/tokeninfo", addr),
        cache_max_entries: 5,
        cache_ttl_secs: 60,
        upstream_timeout_ms: 1000,
        ..Config::default()
    };

    let state = AppState::from_config(&config).unwrap();
    assert!(state.cache.is_enabled());
    let app = create_router(state);

    let (_, headers, _) = call(&app, "/?access_token=foo").await;
    assert_eq!(x_cache(&headers), Some("MISS"));
    let (_, headers, _) = call(&app, "/?access_token=foo").await;
    assert_eq!(x_cache(&headers), Some("HIT"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_state_from_config_with_zero_ttl_disables_cache() {
    let (addr, calls) = token_info_upstream().await;
    let config = Config {
        upstream_url: format!("http://{}/oauth2/tokeninfo", addr),
        cache_ttl_secs: 0,
        upstream_timeout_ms: 1000,
        ..Config::default()
    };

    let state = AppState::from_config(&config).unwrap();
    assert!(!state.cache.is_enabled());
    let app = create_router(state);

    for _ in 0..2 {
        let (_, headers, _) = call(&app, "/?access_token=foo").await;
        assert_eq!(x_cache(&headers), Some("MISS"));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_state_from_invalid_config() {
    let config = Config {
        upstream_timeout_ms: 0,
        ..Config::default()
    };
    assert!(AppState::from_config(&config).is_err());
}
