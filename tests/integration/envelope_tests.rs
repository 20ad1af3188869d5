//! Response envelope, root, health and ingest tests.
//!
//! Tests verify:
//! - Cross-origin headers on success, redirect and error responses
//! - `OPTIONS` on any path returns an empty 204
//! - Root redirect, health check and unmatched routes
//! - The ingest endpoint answers 501 whether or not it is enabled

use axum::http::{Method, StatusCode};

use catalog_gateway::server::CorsPolicy;
use catalog_gateway::store::MemoryStore;

use super::test_utils::{
    assert_cors, body_bytes, body_json, empty_router, get, header, router_with,
    router_with_config, send, test_config, CATALOG_PAGE,
};

// =============================================================================
// Cross-Origin Headers
// =============================================================================

#[tokio::test]
async fn test_cors_on_success_redirect_and_error() {
    let kv = MemoryStore::new()
        .with("catalog/tools/registry.json", "[]")
        .with("catalog/tools/x/latest.json", r#"{"version":"1.0.0"}"#);
    let router = router_with(kv, MemoryStore::new());

    for uri in [
        "/tools/registry.json",
        "/tools/x/latest/a.bin",
        "/tools/x/1.0.0/a.bin",
        "/nope",
        "/",
        "/_health",
    ] {
        let response = get(router.clone(), uri).await;
        assert_cors(&response);
    }
}

#[tokio::test]
async fn test_options_is_empty_204_on_any_path() {
    for uri in ["/", "/tools/registry.json", "/does/not/exist", "/_ingest/github"] {
        let response = send(empty_router(), Method::OPTIONS, uri).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT, "{}", uri);
        assert_cors(&response);
        assert!(body_bytes(response).await.is_empty());
    }
}

#[tokio::test]
async fn test_custom_allow_origin() {
    let cors = CorsPolicy::permissive()
        .with_allow_origin("https://app.example.com")
        .unwrap();
    let router = router_with_config(
        MemoryStore::new(),
        MemoryStore::new(),
        test_config().with_cors(cors),
    );

    let response = get(router, "/_health").await;
    assert_eq!(
        header(&response, "access-control-allow-origin"),
        Some("https://app.example.com")
    );
}

// =============================================================================
// Root, Health and Unmatched
// =============================================================================

#[tokio::test]
async fn test_root_redirects_to_catalog_page() {
    for uri in ["/", "/catalog", "/catalog/"] {
        let response = get(empty_router(), uri).await;
        assert_eq!(response.status(), StatusCode::FOUND, "{}", uri);
        assert_eq!(header(&response, "location"), Some(CATALOG_PAGE));
    }
}

#[tokio::test]
async fn test_health_reports_worker_and_prefix() {
    let response = get(empty_router(), "/_health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let health = body_json(response).await;
    assert_eq!(health["ok"], true);
    assert_eq!(health["worker"], "catalog-test");
    assert_eq!(health["legacy_prefix"], false);
    assert!(health["time"].is_string());
    assert!(health["version"].is_string());

    let response = get(empty_router(), "/catalog/_health").await;
    let health = body_json(response).await;
    assert_eq!(health["legacy_prefix"], true);
}

#[tokio::test]
async fn test_unmatched_is_404() {
    for uri in ["/tools", "/tools/x", "/tools/x/1.0.0", "/catalogue/tools/registry.json"] {
        let response = get(empty_router(), uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(body_json(response).await["error"], "not_found");
    }
}

#[tokio::test]
async fn test_legacy_prefix_stripped_once() {
    let kv = MemoryStore::new().with("catalog/catalog/registry.json", "[]");
    let router = router_with(kv, MemoryStore::new());

    // `/catalog/catalog/registry.json` is the registry of kind `catalog`
    let response = get(router, "/catalog/catalog/registry.json").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_write_methods_on_read_routes_are_unmatched() {
    let response = send(empty_router(), Method::POST, "/tools/registry.json").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_cors(&response);
}

// =============================================================================
// Ingest
// =============================================================================

#[tokio::test]
async fn test_ingest_disabled_is_501_with_pending_work() {
    let response = send(empty_router(), Method::POST, "/_ingest/github").await;
    assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    assert_cors(&response);

    let error = body_json(response).await;
    assert_eq!(error["error"], "disabled");
    assert!(!error["pending"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_ingest_enabled_is_still_501() {
    let router = router_with_config(
        MemoryStore::new(),
        MemoryStore::new(),
        test_config().with_ingest_enabled(true),
    );

    let response = send(router, Method::POST, "/catalog/_ingest/github").await;
    assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);

    let error = body_json(response).await;
    assert_eq!(error["error"], "not_implemented");
    assert!(error.get("pending").is_none());
}

#[tokio::test]
async fn test_ingest_get_is_unmatched() {
    let response = get(empty_router(), "/_ingest/github").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
