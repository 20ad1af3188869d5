//! Artifact serving tests.
//!
//! Tests verify:
//! - Artifacts are read from the blob store under the canonical key
//! - Content type falls back by file extension only when none is stored
//! - Strong validators and the immutable one-year cache policy
//! - Stored content metadata is propagated

use std::sync::Arc;

use axum::http::{Method, StatusCode};

use catalog_gateway::catalog::ContentTypeTable;
use catalog_gateway::store::{BlobMetadata, BlobObject, MemoryStore};
use catalog_gateway::{create_router, CatalogService};

use super::test_utils::{
    body_bytes, body_json, get, header, router_with, send, test_config, CountingStore,
};

const IMMUTABLE: &str = "public, max-age=31536000, immutable";

fn blobs_with(key: &str, data: &'static str) -> MemoryStore {
    MemoryStore::new().with(key, data)
}

#[tokio::test]
async fn test_artifact_missing_is_404() {
    let router = router_with(MemoryStore::new(), MemoryStore::new());

    let response = get(router, "/tools/x/2.1.0/config.yaml").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let error = body_json(response).await;
    assert_eq!(error["error"], "not_found");
}

#[tokio::test]
async fn test_artifact_yaml_fallback_and_immutable_cache() {
    let blobs = blobs_with("catalog/tools/x/2.1.0/config.yaml", "name: x\n");
    let router = router_with(MemoryStore::new(), blobs);

    let response = get(router, "/tools/x/2.1.0/config.yaml").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header(&response, "content-type"),
        Some("text/yaml; charset=utf-8")
    );
    assert_eq!(header(&response, "cache-control"), Some(IMMUTABLE));
    assert_eq!(&body_bytes(response).await[..], b"name: x\n");
}

#[tokio::test]
async fn test_artifact_fallback_table_order() {
    let blobs = MemoryStore::new()
        .with("catalog/tools/x/1.0.0/manifest.json", "{}")
        .with("catalog/tools/x/1.0.0/values.YML", "a: 1")
        .with("catalog/tools/x/1.0.0/pkg.tar.gz", "\x1f\u{8b}");

    let cases = [
        ("/tools/x/1.0.0/manifest.json", "application/json; charset=utf-8"),
        ("/tools/x/1.0.0/values.YML", "text/yaml; charset=utf-8"),
        ("/tools/x/1.0.0/pkg.tar.gz", "application/octet-stream"),
    ];

    for (uri, expected) in cases {
        let router = router_with(MemoryStore::new(), blobs.clone());
        let response = get(router, uri).await;
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        assert_eq!(header(&response, "content-type"), Some(expected), "{}", uri);
    }
}

#[tokio::test]
async fn test_artifact_stored_content_type_wins() {
    let blobs = MemoryStore::new().with_object(
        "catalog/tools/x/1.0.0/config.yaml",
        BlobObject::new("name: x").with_content_type("application/x-yaml"),
    );
    let router = router_with(MemoryStore::new(), blobs);

    let response = get(router, "/tools/x/1.0.0/config.yaml").await;
    assert_eq!(
        header(&response, "content-type"),
        Some("application/x-yaml")
    );
}

#[tokio::test]
async fn test_artifact_custom_content_type_table() {
    let blobs = blobs_with("catalog/tools/x/1.0.0/notes.md", "# notes");
    let catalog = CatalogService::new(Arc::new(MemoryStore::new()), Arc::new(blobs))
        .with_content_types(ContentTypeTable::default().with_rule(".md", "text/markdown"));
    let router = create_router(catalog, test_config());

    let response = get(router, "/tools/x/1.0.0/notes.md").await;
    assert_eq!(header(&response, "content-type"), Some("text/markdown"));
}

#[tokio::test]
async fn test_artifact_etag_is_strong() {
    let blobs = MemoryStore::new()
        .with_object(
            "catalog/tools/x/1.0.0/a.bin",
            BlobObject::new("a").with_etag("abc123"),
        )
        .with_object(
            "catalog/tools/x/1.0.0/b.bin",
            BlobObject::new("b").with_etag("\"def456\""),
        );

    let response = get(
        router_with(MemoryStore::new(), blobs.clone()),
        "/tools/x/1.0.0/a.bin",
    )
    .await;
    assert_eq!(header(&response, "etag"), Some("\"abc123\""));

    let response = get(router_with(MemoryStore::new(), blobs), "/tools/x/1.0.0/b.bin").await;
    assert_eq!(header(&response, "etag"), Some("\"def456\""));
}

#[tokio::test]
async fn test_artifact_metadata_propagated() {
    let object = BlobObject {
        metadata: BlobMetadata {
            content_type: Some("application/gzip".to_string()),
            content_encoding: Some("gzip".to_string()),
            content_language: None,
            content_disposition: Some("attachment; filename=\"pkg.tar.gz\"".to_string()),
            last_modified: Some("Wed, 01 May 2024 12:00:00 GMT".to_string()),
        },
        ..BlobObject::new("data")
    };
    let blobs = MemoryStore::new().with_object("catalog/tools/x/1.0.0/pkg.tar.gz", object);
    let router = router_with(MemoryStore::new(), blobs);

    let response = get(router, "/tools/x/1.0.0/pkg.tar.gz").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "content-type"), Some("application/gzip"));
    assert_eq!(header(&response, "content-encoding"), Some("gzip"));
    assert!(header(&response, "content-language").is_none());
    assert_eq!(
        header(&response, "content-disposition"),
        Some("attachment; filename=\"pkg.tar.gz\"")
    );
    assert_eq!(
        header(&response, "last-modified"),
        Some("Wed, 01 May 2024 12:00:00 GMT")
    );
    assert_eq!(header(&response, "cache-control"), Some(IMMUTABLE));
}

#[tokio::test]
async fn test_artifact_nested_file_path() {
    let blobs = blobs_with("catalog/tools/x/1.0.0/docs/guide/intro.md", "hi");
    let router = router_with(MemoryStore::new(), blobs);

    let response = get(router, "/tools/x/1.0.0/docs/guide/intro.md").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(&body_bytes(response).await[..], b"hi");
}

#[tokio::test]
async fn test_artifact_percent_decoded_key() {
    let blobs = blobs_with("catalog/tools/my tool/1.0.0/read me.txt", "hi");
    let router = router_with(MemoryStore::new(), blobs);

    let response = get(router, "/tools/my%20tool/1.0.0/read%20me.txt").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_artifact_invalid_utf8_is_bad_request() {
    let router = router_with(MemoryStore::new(), MemoryStore::new());

    let response = get(router, "/tools/x/1.0.0/%FF.bin").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "bad_request");
}

#[tokio::test]
async fn test_artifact_head_request() {
    let blobs = blobs_with("catalog/tools/x/1.0.0/config.yaml", "name: x\n");
    let router = router_with(MemoryStore::new(), blobs);

    let response = send(router, Method::HEAD, "/tools/x/1.0.0/config.yaml").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "cache-control"), Some(IMMUTABLE));
}

#[tokio::test]
async fn test_artifact_reads_blob_store_only() {
    let store = CountingStore::new(blobs_with("catalog/tools/x/1.0.0/a.bin", "a"));
    let catalog = CatalogService::new(Arc::new(store.clone()), Arc::new(store.clone()));
    let router = create_router(catalog, test_config());

    let response = get(router, "/tools/x/1.0.0/a.bin").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.blob_reads(), 1);
    assert_eq!(store.kv_reads(), 0);
}
