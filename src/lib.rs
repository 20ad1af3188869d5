//! # Catalog Gateway
//!
//! A read-only HTTP gateway over a catalog of versioned artifacts.
//!
//! The gateway translates a small URL grammar onto two backing stores:
//!
//! - a **blob store** holding immutable artifacts under
//!   `catalog/<kind>/<id>/<version>/<file>`
//! - a **key-value store** holding mutable registry listings
//!   (`catalog/<kind>/registry.json`) and latest pointers
//!   (`catalog/<kind>/<id>/latest.json`)
//!
//! Responses carry caching semantics matched to the mutability of what is
//! served: short-lived registry listings, shorter-lived `latest` redirects and
//! immutable, year-long artifact responses.
//!
//! ## Architecture
//!
//! - [`key`] - storage key canonicalization
//! - [`store`] - key-value and blob store traits with S3 and in-memory backends
//! - [`catalog`] - registry, latest and artifact resolvers
//! - [`server`] - path routing, response envelope and the Axum router
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use catalog_gateway::{create_router, CatalogService, MemoryStore, RouterConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = MemoryStore::new()
//!         .with("catalog/tools/registry.json", r#"{"entries":[]}"#);
//!     let catalog = CatalogService::new(Arc::new(store.clone()), Arc::new(store));
//!
//!     let router = create_router(
//!         catalog,
//!         RouterConfig::new("https://example.com/catalog/").with_legacy_prefix("/catalog"),
//!     );
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod key;
pub mod server;
pub mod store;

// Re-export commonly used types
pub use catalog::{
    canonical_path, ArtifactResponse, CatalogService, ContentTypeTable, LatestPointer,
    LatestResolution, RegistryDocument,
};
pub use config::{CheckConfig, Cli, Command, ResolveConfig, ServeConfig, StoreConfig};
pub use error::{ResolveError, StoreError};
pub use key::{join, CatalogKeys};
pub use server::{
    create_router, AppState, CachePolicy, CorsPolicy, ErrorResponse, HealthResponse, IngestGate,
    Route, RouterConfig,
};
pub use store::{
    create_s3_client, BlobMetadata, BlobObject, BlobStore, KvStore, MemoryStore, S3BlobStore,
    S3KvStore,
};
