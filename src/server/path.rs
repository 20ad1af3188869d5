//! Request path normalization and route classification.
//!
//! A request path goes through two steps:
//!
//! 1. [`normalize`] strips the legacy mount prefix (at most once), producing a
//!    single root-mounted path plus a flag recording whether the prefix was seen.
//! 2. [`Route::classify`] matches the raw normalized path against the route
//!    shapes, most specific first, and percent-decodes the captured parameters.
//!
//! ```text
//! /                                    Root
//! /_health                             Health
//! /_ingest/github                      Ingest
//! /{kind}/registry.json                Registry
//! /{kind}/{id}/latest/{file...}        LatestAlias
//! /{kind}/{id}/{version}/{file...}     Artifact   (catch-all, checked last)
//! ```

use http::Method;

use crate::error::ResolveError;

/// Default legacy mount prefix.
pub const DEFAULT_LEGACY_PREFIX: &str = "/catalog";

const HEALTH_PATH: &str = "_health";
const INGEST_PATH: &str = "_ingest/github";
const REGISTRY_SEGMENT: &str = "registry.json";
const LATEST_SEGMENT: &str = "latest";

/// Normalize a configured legacy prefix to `/segment[/segment...]` form.
///
/// Returns `None` for an empty prefix or one made only of slashes.
pub fn normalize_prefix(prefix: &str) -> Option<String> {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(format!("/{}", trimmed))
    }
}

/// A request path with the legacy prefix removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedPath<'a> {
    /// Root-mounted path, always starting with `/`
    pub path: &'a str,

    /// Whether the request arrived under the legacy prefix
    pub legacy: bool,
}

/// Strip `legacy_prefix` from `raw` once, if present.
///
/// The prefix only matches on a segment boundary: with prefix `/catalog`,
/// `/catalog` and `/catalog/x` are legacy paths but `/catalogue/x` is not.
pub fn normalize<'a>(raw: &'a str, legacy_prefix: Option<&str>) -> NormalizedPath<'a> {
    if let Some(prefix) = legacy_prefix {
        if raw == prefix {
            return NormalizedPath {
                path: "/",
                legacy: true,
            };
        }
        if let Some(rest) = raw.strip_prefix(prefix) {
            if rest.starts_with('/') {
                return NormalizedPath {
                    path: rest,
                    legacy: true,
                };
            }
        }
    }

    NormalizedPath {
        path: if raw.is_empty() { "/" } else { raw },
        legacy: false,
    }
}

/// The route shapes served by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Root,
    Health,
    Ingest,
    Registry {
        kind: String,
    },
    LatestAlias {
        kind: String,
        id: String,
        file: String,
    },
    Artifact {
        kind: String,
        id: String,
        version: String,
        file: String,
    },
    Unmatched,
}

impl Route {
    /// Classify a normalized path.
    ///
    /// Matching runs on the raw path; captured parameters are percent-decoded
    /// afterwards. A parameter that does not decode to UTF-8 is a bad request.
    pub fn classify(method: &Method, path: &str) -> Result<Route, ResolveError> {
        let is_read = method == Method::GET || method == Method::HEAD;
        let trimmed = path.strip_prefix('/').unwrap_or(path);

        if trimmed.is_empty() {
            return Ok(if is_read { Route::Root } else { Route::Unmatched });
        }

        if trimmed == HEALTH_PATH {
            return Ok(if is_read { Route::Health } else { Route::Unmatched });
        }

        if trimmed == INGEST_PATH {
            return Ok(if method == Method::POST {
                Route::Ingest
            } else {
                Route::Unmatched
            });
        }

        if !is_read {
            return Ok(Route::Unmatched);
        }

        let parts: Vec<&str> = trimmed.splitn(4, '/').collect();

        // /{kind}/registry.json
        if let [kind, REGISTRY_SEGMENT] = parts.as_slice() {
            if !kind.is_empty() {
                return Ok(Route::Registry {
                    kind: decode(kind)?,
                });
            }
        }

        let [kind, id, third, file] = parts.as_slice() else {
            return Ok(Route::Unmatched);
        };
        if kind.is_empty() || id.is_empty() || third.is_empty() || file.is_empty() {
            return Ok(Route::Unmatched);
        }

        // /{kind}/{id}/latest/{file...}
        if *third == LATEST_SEGMENT {
            return Ok(Route::LatestAlias {
                kind: decode(kind)?,
                id: decode(id)?,
                file: decode(file)?,
            });
        }

        // /{kind}/{id}/{version}/{file...}
        Ok(Route::Artifact {
            kind: decode(kind)?,
            id: decode(id)?,
            version: decode(third)?,
            file: decode(file)?,
        })
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Route::Root => "root",
            Route::Health => "health",
            Route::Ingest => "ingest",
            Route::Registry { .. } => "registry",
            Route::LatestAlias { .. } => "latest",
            Route::Artifact { .. } => "artifact",
            Route::Unmatched => "unmatched",
        }
    }
}

fn decode(segment: &str) -> Result<String, ResolveError> {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .map_err(|_| {
            ResolveError::BadRequest(format!("path segment is not valid UTF-8: {}", segment))
        })
}
