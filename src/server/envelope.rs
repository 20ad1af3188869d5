//! Response envelope: cross-origin headers, cache policy and redirects.
//!
//! Every response leaving the router, errors included, passes through
//! [`cors_middleware`], which stamps the configured [`CorsPolicy`] headers.
//! `OPTIONS` on any path short-circuits to an empty 204.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http::header::{
    HeaderName, HeaderValue, InvalidHeaderValue, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_EXPOSE_HEADERS,
    ACCESS_CONTROL_MAX_AGE, CACHE_CONTROL, LOCATION,
};
use http::{HeaderMap, Method, StatusCode};
use tracing::warn;

use crate::error::ResolveError;

// =============================================================================
// Cross-Origin Policy
// =============================================================================

/// Fixed set of cross-origin headers attached to every response.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allow_origin: HeaderValue,
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
    expose_headers: HeaderValue,
    max_age: HeaderValue,
}

impl CorsPolicy {
    /// Any origin may read; GET/HEAD/POST/OPTIONS allowed; preflight cached for a day.
    pub fn permissive() -> Self {
        Self {
            allow_origin: HeaderValue::from_static("*"),
            allow_methods: HeaderValue::from_static("GET, HEAD, POST, OPTIONS"),
            allow_headers: HeaderValue::from_static("Content-Type, Authorization"),
            expose_headers: HeaderValue::from_static("ETag, Location, Content-Length"),
            max_age: HeaderValue::from_static("86400"),
        }
    }

    /// Replace the allowed origin.
    pub fn with_allow_origin(mut self, origin: &str) -> Result<Self, InvalidHeaderValue> {
        self.allow_origin = HeaderValue::from_str(origin)?;
        Ok(self)
    }

    /// Replace the allowed request headers.
    pub fn with_allow_headers(mut self, headers: &str) -> Result<Self, InvalidHeaderValue> {
        self.allow_headers = HeaderValue::from_str(headers)?;
        Ok(self)
    }

    /// The header set as name/value pairs.
    pub fn headers(&self) -> [(HeaderName, &HeaderValue); 5] {
        [
            (ACCESS_CONTROL_ALLOW_ORIGIN, &self.allow_origin),
            (ACCESS_CONTROL_ALLOW_METHODS, &self.allow_methods),
            (ACCESS_CONTROL_ALLOW_HEADERS, &self.allow_headers),
            (ACCESS_CONTROL_EXPOSE_HEADERS, &self.expose_headers),
            (ACCESS_CONTROL_MAX_AGE, &self.max_age),
        ]
    }

    /// Insert the header set, replacing any existing values.
    pub fn apply(&self, headers: &mut HeaderMap) {
        for (name, value) in self.headers() {
            headers.insert(name, value.clone());
        }
    }
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self::permissive()
    }
}

/// Middleware applying a [`CorsPolicy`] to every response.
pub async fn cors_middleware(
    State(cors): State<CorsPolicy>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() == Method::OPTIONS {
        let mut response = StatusCode::NO_CONTENT.into_response();
        cors.apply(response.headers_mut());
        return response;
    }

    let mut response = next.run(request).await;
    cors.apply(response.headers_mut());
    response
}

// =============================================================================
// Cache Policy
// =============================================================================

/// Default registry cache lifetime in seconds.
pub const DEFAULT_REGISTRY_MAX_AGE: u32 = 60;

/// Default latest-alias redirect cache lifetime in seconds.
pub const DEFAULT_LATEST_MAX_AGE: u32 = 30;

/// Default versioned artifact cache lifetime in seconds (one year).
pub const DEFAULT_ARTIFACT_MAX_AGE: u32 = 31_536_000;

/// Cache lifetimes per mutability class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Registry listings change whenever a version is published
    pub registry_max_age: u32,

    /// Latest redirects are the most staleness-sensitive responses
    pub latest_max_age: u32,

    /// Versioned artifacts never change once published
    pub artifact_max_age: u32,
}

impl CachePolicy {
    pub fn registry(&self) -> String {
        format!("public, max-age={}", self.registry_max_age)
    }

    pub fn latest(&self) -> String {
        format!("public, max-age={}", self.latest_max_age)
    }

    pub fn artifact(&self) -> String {
        format!("public, max-age={}, immutable", self.artifact_max_age)
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            registry_max_age: DEFAULT_REGISTRY_MAX_AGE,
            latest_max_age: DEFAULT_LATEST_MAX_AGE,
            artifact_max_age: DEFAULT_ARTIFACT_MAX_AGE,
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Build a 302 redirect, optionally cacheable.
pub fn redirect(location: &str, cache_control: Option<&str>) -> Result<Response, ResolveError> {
    let location = HeaderValue::from_str(location)
        .map_err(|_| ResolveError::BadRequest(format!("invalid redirect target: {}", location)))?;

    let mut response = StatusCode::FOUND.into_response();
    let headers = response.headers_mut();
    headers.insert(LOCATION, location);
    if let Some(cache_control) = cache_control {
        insert_header(headers, CACHE_CONTROL, cache_control);
    }

    Ok(response)
}

/// Insert a header from a dynamic string, skipping values that are not valid
/// header text.
pub fn insert_header(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(_) => {
            warn!(header = %name, value = value, "Dropping invalid header value");
        }
    }
}
