//! Router configuration for the catalog gateway.
//!
//! There is a single fallback handler: routing is done by
//! [`Route::classify`](super::path::Route::classify) rather than by axum path
//! patterns, so that precedence between the route shapes is explicit and the
//! legacy prefix is handled in one place.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use catalog_gateway::catalog::CatalogService;
//! use catalog_gateway::server::routes::{create_router, RouterConfig};
//! use catalog_gateway::store::MemoryStore;
//!
//! let store = Arc::new(MemoryStore::new());
//! let catalog = CatalogService::new(store.clone(), store);
//!
//! let config = RouterConfig::new("https://example.com/catalog/")
//!     .with_legacy_prefix("/catalog")
//!     .with_ingest_enabled(false);
//!
//! let router = create_router(catalog, config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, router).await?;
//! ```

use axum::{middleware, Router};
use tower_http::trace::TraceLayer;

use super::envelope::{cors_middleware, CachePolicy, CorsPolicy};
use super::handlers::{dispatch_handler, AppState};
use super::ingest::IngestGate;
use super::path::normalize_prefix;
use crate::catalog::CatalogService;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Target of the `/` redirect
    pub catalog_page_url: String,

    /// Legacy mount prefix, normalized; None disables prefix stripping
    pub legacy_prefix: Option<String>,

    /// Identity reported by `/_health`
    pub worker_name: String,

    /// Feature flag for the ingest webhook
    pub ingest_enabled: bool,

    pub cache: CachePolicy,

    pub cors: CorsPolicy,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl RouterConfig {
    /// Create a configuration redirecting `/` to `catalog_page_url`.
    ///
    /// By default:
    /// - No legacy prefix
    /// - Ingest disabled
    /// - Registry 60s, latest 30s, artifacts one year immutable
    /// - CORS allows any origin
    /// - Tracing is enabled
    pub fn new(catalog_page_url: impl Into<String>) -> Self {
        Self {
            catalog_page_url: catalog_page_url.into(),
            legacy_prefix: None,
            worker_name: env!("CARGO_PKG_NAME").to_string(),
            ingest_enabled: false,
            cache: CachePolicy::default(),
            cors: CorsPolicy::permissive(),
            enable_tracing: true,
        }
    }

    /// Accept requests mounted under `prefix` as well as at the root.
    ///
    /// An empty prefix disables stripping.
    pub fn with_legacy_prefix(mut self, prefix: &str) -> Self {
        self.legacy_prefix = normalize_prefix(prefix);
        self
    }

    pub fn with_worker_name(mut self, name: impl Into<String>) -> Self {
        self.worker_name = name.into();
        self
    }

    pub fn with_ingest_enabled(mut self, enabled: bool) -> Self {
        self.ingest_enabled = enabled;
        self
    }

    pub fn with_cache_policy(mut self, cache: CachePolicy) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_cors(mut self, cors: CorsPolicy) -> Self {
        self.cors = cors;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the application router.
///
/// Every response, including errors and `OPTIONS` preflights, carries the
/// configured cross-origin headers.
pub fn create_router(catalog: CatalogService, config: RouterConfig) -> Router {
    let state = AppState {
        cache: config.cache,
        legacy_prefix: config.legacy_prefix.clone(),
        worker_name: config.worker_name.clone(),
        ingest: IngestGate::new(config.ingest_enabled),
        ..AppState::new(catalog, config.catalog_page_url.clone())
    };

    let router = Router::new()
        .fallback(dispatch_handler)
        .with_state(state)
        .layer(middleware::from_fn_with_state(
            config.cors.clone(),
            cors_middleware,
        ));

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

// =============================================================================
// Tests
// =============================================================================
