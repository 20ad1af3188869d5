//! Backing store abstractions.
//!
//! The gateway reads from two stores and never writes to either:
//!
//! ```text
//! ┌──────────────────────────┐      ┌──────────────────────────────┐
//! │         KvStore          │      │          BlobStore           │
//! │  registry.json listings  │      │  immutable versioned files   │
//! │  latest.json pointers    │      │  + content metadata / etag   │
//! └──────────────────────────┘      └──────────────────────────────┘
//! ```
//!
//! Both traits expose a single point read. A missing key is `Ok(None)`;
//! only backend failures are errors.

mod memory;
mod s3;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::StoreError;

pub use memory::MemoryStore;
pub use s3::{create_s3_client, S3BlobStore, S3KvStore};

/// Key-value store holding mutable registry listings and latest pointers.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read the raw value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<Bytes>, StoreError>;
}

/// Blob store holding immutable artifacts.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Read the object stored under `key` together with its metadata.
    async fn get(&self, key: &str) -> Result<Option<BlobObject>, StoreError>;
}

/// An object read from the blob store.
#[derive(Debug, Clone, Default)]
pub struct BlobObject {
    /// Object bytes
    pub data: Bytes,

    /// HTTP metadata recorded alongside the object
    pub metadata: BlobMetadata,

    /// Entity tag reported by the store (quoted or bare)
    pub etag: Option<String>,
}

impl BlobObject {
    /// Create an object with no metadata and no etag.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            metadata: BlobMetadata::default(),
            etag: None,
        }
    }

    /// Set the stored content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.metadata.content_type = Some(content_type.into());
        self
    }

    /// Set the entity tag.
    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    /// Entity tag as a strong validator, quoted per RFC 9110.
    ///
    /// Weak tags (`W/"..."`) are returned unchanged.
    pub fn strong_etag(&self) -> Option<String> {
        let etag = self.etag.as_deref()?.trim();
        if etag.is_empty() {
            return None;
        }
        if etag.starts_with('"') || etag.starts_with("W/") {
            Some(etag.to_string())
        } else {
            Some(format!("\"{}\"", etag))
        }
    }
}

/// HTTP content metadata a store may keep for a blob.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlobMetadata {
    pub content_type: Option<String>,
    pub content_encoding: Option<String>,
    pub content_language: Option<String>,
    pub content_disposition: Option<String>,
    /// Already formatted as an HTTP date
    pub last_modified: Option<String>,
}
