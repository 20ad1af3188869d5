//! HTTP request handling for the catalog gateway.
//!
//! All requests go through [`dispatch_handler`], which normalizes the path,
//! classifies it into a [`Route`] and runs exactly one resolver.
//!
//! # Endpoints
//!
//! - `GET /` - Redirect to the catalog browsing page
//! - `GET /_health` - Health check
//! - `POST /_ingest/github` - Publish webhook (gated, not implemented)
//! - `GET /{kind}/registry.json` - Registry listing
//! - `GET /{kind}/{id}/latest/{file}` - Redirect to the current version
//! - `GET /{kind}/{id}/{version}/{file}` - Versioned artifact

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{OriginalUri, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, error, warn};
use url::Url;

use super::envelope::{insert_header, redirect, CachePolicy};
use super::ingest::{IngestGate, PENDING_INGEST_WORK};
use super::path::{normalize, Route};
use crate::catalog::{CatalogService, JSON_CONTENT_TYPE};
use crate::error::{ResolveError, StoreError};

// =============================================================================
// Application State
// =============================================================================

/// Shared application state passed to the dispatcher.
#[derive(Clone)]
pub struct AppState {
    /// Resolvers over the backing stores
    pub catalog: Arc<CatalogService>,

    /// Cache lifetimes per mutability class
    pub cache: CachePolicy,

    /// Legacy mount prefix, normalized (`/catalog`)
    pub legacy_prefix: Option<String>,

    /// Where `/` redirects to
    pub catalog_page_url: String,

    /// Identity reported by the health check
    pub worker_name: String,

    pub ingest: IngestGate,
}

impl AppState {
    /// Create state with default cache policy and no legacy prefix.
    pub fn new(catalog: CatalogService, catalog_page_url: impl Into<String>) -> Self {
        Self {
            catalog: Arc::new(catalog),
            cache: CachePolicy::default(),
            legacy_prefix: None,
            catalog_page_url: catalog_page_url.into(),
            worker_name: env!("CARGO_PKG_NAME").to_string(),
            ingest: IngestGate::default(),
        }
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error kind (e.g. "not_found", "invalid_latest")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code (included for convenience)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    /// Remaining work, for features that are not built yet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending: Option<Vec<String>>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: None,
            pending: None,
        }
    }

    pub fn with_status(
        error: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            status: Some(status.as_u16()),
            ..Self::new(error, message)
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,

    /// Configured worker identity
    pub worker: String,

    /// Current time, RFC 3339
    pub time: String,

    /// Whether the request arrived under the legacy prefix
    pub legacy_prefix: bool,

    pub version: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Convert ResolveError to HTTP response.
///
/// 404s log at debug, other 4xx at warn, 5xx at error. Store failures are
/// reported to the client without backend detail.
impl IntoResponse for ResolveError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let (status, message) = match &self {
            ResolveError::NotFound { key } => {
                (StatusCode::NOT_FOUND, format!("Not found: {}", key))
            }
            ResolveError::NoRoute { path } => {
                (StatusCode::NOT_FOUND, format!("No route for {}", path))
            }
            ResolveError::InvalidLatest { key, reason } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Latest pointer {} is invalid: {}", key, reason),
            ),
            ResolveError::Disabled => (
                StatusCode::NOT_IMPLEMENTED,
                "Ingest is not enabled on this deployment".to_string(),
            ),
            ResolveError::NotImplemented => (
                StatusCode::NOT_IMPLEMENTED,
                "Ingest is enabled but not implemented yet".to_string(),
            ),
            ResolveError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ResolveError::Store(StoreError::S3(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Storage backend error".to_string(),
            ),
            ResolveError::Store(StoreError::Connection(_)) => (
                StatusCode::BAD_GATEWAY,
                "Storage backend unreachable".to_string(),
            ),
        };

        if status.is_server_error() && status != StatusCode::NOT_IMPLEMENTED {
            error!(
                error_type = kind,
                status = status.as_u16(),
                "Server error: {}",
                self
            );
        } else if status == StatusCode::NOT_FOUND {
            debug!(
                error_type = kind,
                status = status.as_u16(),
                "Resource not found: {}",
                message
            );
        } else {
            warn!(
                error_type = kind,
                status = status.as_u16(),
                "Request rejected: {}",
                message
            );
        }

        let mut body = ErrorResponse::with_status(kind, message, status);
        if matches!(self, ResolveError::Disabled) {
            body.pending = Some(PENDING_INGEST_WORK.iter().map(|s| s.to_string()).collect());
        }

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Entry point for every request.
pub async fn dispatch_handler(
    State(state): State<AppState>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> Result<Response, ResolveError> {
    let normalized = normalize(uri.path(), state.legacy_prefix.as_deref());
    let route = Route::classify(&method, normalized.path)?;

    debug!(
        method = %method,
        path = uri.path(),
        route = route.name(),
        legacy = normalized.legacy,
        "Dispatching request"
    );

    match route {
        Route::Root => redirect(&state.catalog_page_url, None),
        Route::Health => Ok(health_handler(&state, normalized.legacy).into_response()),
        Route::Ingest => Err(state.ingest.handle()),
        Route::Registry { kind } => registry_handler(&state, &kind).await,
        Route::LatestAlias { kind, id, file } => {
            latest_handler(&state, &uri, &headers, &kind, &id, &file).await
        }
        Route::Artifact {
            kind,
            id,
            version,
            file,
        } => artifact_handler(&state, &kind, &id, &version, &file).await,
        Route::Unmatched => Err(ResolveError::NoRoute {
            path: uri.path().to_string(),
        }),
    }
}

/// Handle health check requests.
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "ok": true,
///   "worker": "catalog-gateway",
///   "time": "2024-05-01T12:00:00.000000+00:00",
///   "legacy_prefix": false,
///   "version": "0.1.0"
/// }
/// ```
pub fn health_handler(state: &AppState, legacy_prefix: bool) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        worker: state.worker_name.clone(),
        time: chrono::Utc::now().to_rfc3339(),
        legacy_prefix,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Serve `/{kind}/registry.json` from the key-value store.
///
/// The listing is relayed byte-for-byte with a short cache lifetime.
pub async fn registry_handler(state: &AppState, kind: &str) -> Result<Response, ResolveError> {
    let document = state.catalog.registry(kind).await?;

    let mut response = Body::from(document.body).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static(JSON_CONTENT_TYPE),
    );
    insert_header(headers, header::CACHE_CONTROL, &state.cache.registry());

    Ok(response)
}

/// Redirect `/{kind}/{id}/latest/{file}` to the current versioned URL.
///
/// The target is always root-mounted on the request's own origin, even when
/// the request came in under the legacy prefix.
pub async fn latest_handler(
    state: &AppState,
    uri: &Uri,
    headers: &HeaderMap,
    kind: &str,
    id: &str,
    file: &str,
) -> Result<Response, ResolveError> {
    let resolved = state.catalog.latest(kind, id, file).await?;
    let location = format!("{}{}", request_origin(uri, headers), resolved.location);

    debug!(kind = kind, id = id, version = %resolved.version, location = %location, "Latest resolved");

    redirect(&location, Some(&state.cache.latest()))
}

/// Serve `/{kind}/{id}/{version}/{file}` from the blob store.
///
/// # Headers
///
/// - `Content-Type`: stored value, or the fallback table
/// - `ETag`: strong validator from the store
/// - `Cache-Control: public, max-age=31536000, immutable`
/// - `Content-Encoding`, `Content-Language`, `Content-Disposition`,
///   `Last-Modified` when the store has them
pub async fn artifact_handler(
    state: &AppState,
    kind: &str,
    id: &str,
    version: &str,
    file: &str,
) -> Result<Response, ResolveError> {
    let artifact = state.catalog.artifact(kind, id, version, file).await?;

    let mut response = Body::from(artifact.data).into_response();
    let headers = response.headers_mut();

    insert_header(headers, header::CONTENT_TYPE, &artifact.content_type);
    if let Some(ref etag) = artifact.etag {
        insert_header(headers, header::ETAG, etag);
    }

    let metadata = &artifact.metadata;
    let optional = [
        (header::CONTENT_ENCODING, &metadata.content_encoding),
        (header::CONTENT_LANGUAGE, &metadata.content_language),
        (header::CONTENT_DISPOSITION, &metadata.content_disposition),
        (header::LAST_MODIFIED, &metadata.last_modified),
    ];
    for (name, value) in optional {
        if let Some(value) = value {
            insert_header(headers, name, value);
        }
    }

    insert_header(headers, header::CACHE_CONTROL, &state.cache.artifact());

    Ok(response)
}

/// Origin (`scheme://host[:port]`) the request was addressed to.
///
/// An absolute-form request URI wins; otherwise the `Host` header is combined
/// with `X-Forwarded-Proto` (default `http`) for reverse proxy support.
pub fn request_origin(uri: &Uri, headers: &HeaderMap) -> String {
    if let (Some(scheme), Some(authority)) = (uri.scheme_str(), uri.authority()) {
        return format!("{}://{}", scheme, authority);
    }

    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");

    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|h| h.to_str().ok())
        .and_then(|p| p.split(',').next())
        .map(str::trim)
        .filter(|p| p.eq_ignore_ascii_case("https"))
        .map(|_| "https")
        .unwrap_or("http");

    match Url::parse(&format!("{}://{}", proto, host)) {
        Ok(url) => url.origin().ascii_serialization(),
        Err(_) => {
            warn!(host = host, "Unparseable Host header, falling back to localhost");
            format!("{}://localhost", proto)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
