//! Registry listing tests.
//!
//! Tests verify:
//! - Listings are relayed byte-for-byte from the key-value store
//! - Missing listings map to 404 `not_found`
//! - Storage failures are reported without backend detail

use axum::http::StatusCode;

use catalog_gateway::error::StoreError;
use catalog_gateway::key::CatalogKeys;
use catalog_gateway::store::MemoryStore;
use catalog_gateway::{create_router, CatalogService};

use super::test_utils::{
    body_bytes, body_json, get, header, router_with, test_config, CountingStore, FailingStore,
};

const REGISTRY: &str = r#"{"entries":[{"id":"x","latest":"2.1.0"}]}"#;

#[tokio::test]
async fn test_registry_missing_returns_404() {
    let router = router_with(MemoryStore::new(), MemoryStore::new());

    let response = get(router, "/tools/registry.json").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let error = body_json(response).await;
    assert_eq!(error["error"], "not_found");
    assert_eq!(error["status"], 404);
}

#[tokio::test]
async fn test_registry_relays_bytes() {
    let kv = MemoryStore::new().with("catalog/tools/registry.json", REGISTRY);
    let router = router_with(kv, MemoryStore::new());

    let response = get(router, "/tools/registry.json").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header(&response, "content-type"),
        Some("application/json; charset=utf-8")
    );
    assert_eq!(
        header(&response, "cache-control"),
        Some("public, max-age=60")
    );

    let body = body_bytes(response).await;
    assert_eq!(&body[..], REGISTRY.as_bytes());
}

#[tokio::test]
async fn test_registry_is_not_validated() {
    // Listings are relayed as-is, even when they are not JSON
    let kv = MemoryStore::new().with("catalog/tools/registry.json", "not json");
    let router = router_with(kv, MemoryStore::new());

    let response = get(router, "/tools/registry.json").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(&body_bytes(response).await[..], b"not json");
}

#[tokio::test]
async fn test_registry_reads_kv_only() {
    let store = CountingStore::new(
        MemoryStore::new().with("catalog/tools/registry.json", REGISTRY),
    );
    let catalog = CatalogService::new(
        std::sync::Arc::new(store.clone()),
        std::sync::Arc::new(store.clone()),
    );
    let router = create_router(catalog, test_config());

    let response = get(router, "/tools/registry.json").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.kv_reads(), 1);
    assert_eq!(store.blob_reads(), 0);
}

#[tokio::test]
async fn test_registry_under_legacy_prefix() {
    let kv = MemoryStore::new().with("catalog/tools/registry.json", REGISTRY);
    let router = router_with(kv, MemoryStore::new());

    let response = get(router, "/catalog/tools/registry.json").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(&body_bytes(response).await[..], REGISTRY.as_bytes());
}

#[tokio::test]
async fn test_registry_custom_key_root() {
    let kv = MemoryStore::new().with("mirror/tools/registry.json", REGISTRY);
    let catalog = CatalogService::new(
        std::sync::Arc::new(kv),
        std::sync::Arc::new(MemoryStore::new()),
    )
    .with_keys(CatalogKeys::new("mirror"));
    let router = create_router(catalog, test_config());

    let response = get(router, "/tools/registry.json").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_registry_storage_error_is_opaque() {
    let store = FailingStore::new(StoreError::S3("AccessDenied: secret-bucket".to_string()));
    let catalog = CatalogService::new(
        std::sync::Arc::new(store.clone()),
        std::sync::Arc::new(store),
    );
    let router = create_router(catalog, test_config());

    let response = get(router, "/tools/registry.json").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let error = body_json(response).await;
    assert_eq!(error["error"], "storage_error");
    assert!(!error["message"].as_str().unwrap().contains("secret-bucket"));
}

#[tokio::test]
async fn test_registry_connection_error_is_bad_gateway() {
    let store = FailingStore::new(StoreError::Connection("timed out".to_string()));
    let catalog = CatalogService::new(
        std::sync::Arc::new(store.clone()),
        std::sync::Arc::new(store),
    );
    let router = create_router(catalog, test_config());

    let response = get(router, "/tools/registry.json").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["error"], "connection_error");
}
