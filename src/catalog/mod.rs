//! Catalog resolution layer.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │             CatalogService              │
//! │   registry  │  latest  │   artifact     │
//! └──────┬──────┴────┬─────┴───────┬────────┘
//!        │           │             │
//!        ▼           ▼             ▼
//!     KvStore     KvStore      BlobStore
//! ```
//!
//! Keys are derived with [`crate::key::CatalogKeys`]; content types for
//! artifacts without stored metadata come from a [`ContentTypeTable`].

mod content_type;
mod latest;
mod service;

pub use content_type::{ContentTypeTable, JSON_CONTENT_TYPE, OCTET_STREAM, YAML_CONTENT_TYPE};
pub use latest::{canonical_path, LatestPointer};
pub use service::{ArtifactResponse, CatalogService, LatestResolution, RegistryDocument};
