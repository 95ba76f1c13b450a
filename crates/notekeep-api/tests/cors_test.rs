//! CORS whitelist behavior on preflight requests.
//!
//! - Only configured origins are echoed back
//! - The caller id header is an allowed request header
//! - Credentials are allowed and preflights are cacheable

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use notekeep_api::config::parse_allowed_origins;
use notekeep_api::{router, ApiConfig, AppState};
use notekeep_core::memory::InMemoryStore;

fn app() -> Router {
    let config = ApiConfig {
        rate_limit: None,
        allowed_origins: parse_allowed_origins("https://keep.example.com, http://localhost:4200"),
        ..ApiConfig::default()
    };
    let store = InMemoryStore::new();
    let state = AppState::new(Arc::new(store.clone()), Arc::new(store), &config);
    router(state, &config)
}

fn preflight(origin: &str) -> Request<Body> {
    Request::builder()
        .method("OPTIONS")
        .uri("/api/notes")
        .header("origin", origin)
        .header("access-control-request-method", "PATCH")
        .header("access-control-request-headers", "x-user-id,content-type")
        .body(Body::empty())
        .expect("request")
}

#[tokio::test]
async fn test_preflight_from_allowed_origin() {
    let response = app()
        .oneshot(preflight("https://keep.example.com"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(
        headers["access-control-allow-origin"],
        "https://keep.example.com"
    );
    assert_eq!(headers["access-control-allow-credentials"], "true");
    assert_eq!(headers["access-control-max-age"], "3600");

    let allowed_headers = headers["access-control-allow-headers"]
        .to_str()
        .expect("ascii header")
        .to_lowercase();
    assert!(allowed_headers.contains("x-user-id"));

    let allowed_methods = headers["access-control-allow-methods"]
        .to_str()
        .expect("ascii header");
    assert!(allowed_methods.contains("PATCH"));
}

#[tokio::test]
async fn test_preflight_from_unknown_origin_gets_no_grant() {
    let response = app()
        .oneshot(preflight("https://evil.example.org"))
        .await
        .expect("response");

    assert!(response
        .headers()
        .get("access-control-allow-origin")
        .is_none());
}

#[test]
fn test_invalid_origins_are_skipped() {
    let origins = parse_allowed_origins("https://valid.com,\u{7f}bad,http://localhost:3000");
    assert_eq!(origins.len(), 2);

    let defaults = parse_allowed_origins("   ");
    assert_eq!(defaults.len(), 2);
}
