//! HTTP server layer for the catalog gateway.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │                                                                 │
//! │  envelope (CORS on every response, OPTIONS → 204)               │
//! │     │                                                           │
//! │     ▼                                                           │
//! │  path::normalize (strip legacy prefix once)                     │
//! │     │                                                           │
//! │     ▼                                                           │
//! │  path::Route::classify ──► handlers (one resolver per route)    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod envelope;
pub mod handlers;
pub mod ingest;
pub mod path;
pub mod routes;

pub use envelope::{cors_middleware, CachePolicy, CorsPolicy};
pub use handlers::{
    artifact_handler, dispatch_handler, health_handler, latest_handler, registry_handler,
    request_origin, AppState, ErrorResponse, HealthResponse,
};
pub use ingest::{IngestGate, PENDING_INGEST_WORK};
pub use path::{normalize, normalize_prefix, NormalizedPath, Route, DEFAULT_LEGACY_PREFIX};
pub use routes::{create_router, RouterConfig};
