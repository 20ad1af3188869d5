use thiserror::Error;

/// Errors raised by a backing store while reading an object.
///
/// A missing key is not an error at this level: stores return `Ok(None)` and
/// the resolvers decide what absence means.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Error reported by S3 or an S3-compatible service
    #[error("S3 error: {0}")]
    S3(String),

    /// Network or connection error while talking to the store
    #[error("Connection error: {0}")]
    Connection(String),
}

/// Outcome of resolving a catalog request that did not produce an object.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// The derived storage key does not exist in its store (HTTP 404)
    #[error("Not found: {key}")]
    NotFound { key: String },

    /// The request path matches no route shape (HTTP 404)
    #[error("No route for {path}")]
    NoRoute { path: String },

    /// A latest pointer exists but cannot be parsed or lacks `version` (HTTP 500)
    #[error("Invalid latest pointer at {key}: {reason}")]
    InvalidLatest { key: String, reason: String },

    /// The ingest pipeline is switched off (HTTP 501)
    #[error("Ingest is not enabled")]
    Disabled,

    /// The ingest pipeline is switched on but has no implementation yet (HTTP 501)
    #[error("Ingest is not implemented")]
    NotImplemented,

    /// The request could not be interpreted (HTTP 400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The backing store failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl ResolveError {
    /// Stable identifier used as the `error` field of JSON error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            ResolveError::NotFound { .. } | ResolveError::NoRoute { .. } => "not_found",
            ResolveError::InvalidLatest { .. } => "invalid_latest",
            ResolveError::Disabled => "disabled",
            ResolveError::NotImplemented => "not_implemented",
            ResolveError::BadRequest(_) => "bad_request",
            ResolveError::Store(StoreError::S3(_)) => "storage_error",
            ResolveError::Store(StoreError::Connection(_)) => "connection_error",
        }
    }
}
