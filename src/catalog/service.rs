//! Catalog service: the three read strategies over the backing stores.
//!
//! Each operation derives its key(s) through [`CatalogKeys`] and performs at
//! most one store read. HTTP concerns (cache headers, redirect origin) are
//! left to the server layer.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, warn};

use super::content_type::ContentTypeTable;
use super::latest::{canonical_path, LatestPointer};
use crate::error::ResolveError;
use crate::key::CatalogKeys;
use crate::store::{BlobMetadata, BlobStore, KvStore};

/// A registry listing, relayed as stored.
#[derive(Debug, Clone)]
pub struct RegistryDocument {
    /// Storage key the listing was read from
    pub key: String,

    /// Raw listing bytes (never parsed)
    pub body: Bytes,
}

/// A resolved latest alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestResolution {
    /// Concrete version named by the pointer
    pub version: String,

    /// Canonical root-mounted path of the versioned artifact, already encoded
    pub location: String,
}

/// A versioned artifact ready to be served.
#[derive(Debug, Clone)]
pub struct ArtifactResponse {
    /// Storage key the artifact was read from
    pub key: String,

    pub data: Bytes,

    /// Stored content type, or the table fallback
    pub content_type: String,

    /// Metadata reported by the store
    pub metadata: BlobMetadata,

    /// Strong validator, when the store provides one
    pub etag: Option<String>,
}

/// Resolves catalog requests against a key-value store and a blob store.
pub struct CatalogService {
    kv: Arc<dyn KvStore>,
    blobs: Arc<dyn BlobStore>,
    keys: CatalogKeys,
    content_types: ContentTypeTable,
}

impl CatalogService {
    /// Create a service with the default key root and content-type table.
    pub fn new(kv: Arc<dyn KvStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            kv,
            blobs,
            keys: CatalogKeys::default(),
            content_types: ContentTypeTable::default(),
        }
    }

    /// Use a different key deriver.
    pub fn with_keys(mut self, keys: CatalogKeys) -> Self {
        self.keys = keys;
        self
    }

    /// Use a different content-type fallback table.
    pub fn with_content_types(mut self, content_types: ContentTypeTable) -> Self {
        self.content_types = content_types;
        self
    }

    pub fn keys(&self) -> &CatalogKeys {
        &self.keys
    }

    pub fn content_types(&self) -> &ContentTypeTable {
        &self.content_types
    }

    /// Read the registry listing for `kind`.
    pub async fn registry(&self, kind: &str) -> Result<RegistryDocument, ResolveError> {
        let key = self.keys.registry(kind);
        debug!(kind = kind, key = %key, "Resolving registry");

        match self.kv.get(&key).await? {
            Some(body) => Ok(RegistryDocument { key, body }),
            None => Err(ResolveError::NotFound { key }),
        }
    }

    /// Resolve the latest pointer for `kind`/`id` into a canonical artifact path.
    ///
    /// The version is not checked against the blob store; a dangling pointer
    /// surfaces as a 404 when the redirect is followed.
    pub async fn latest(
        &self,
        kind: &str,
        id: &str,
        file: &str,
    ) -> Result<LatestResolution, ResolveError> {
        let key = self.keys.latest(kind, id);
        debug!(kind = kind, id = id, key = %key, "Resolving latest pointer");

        let bytes = self
            .kv
            .get(&key)
            .await?
            .ok_or_else(|| ResolveError::NotFound { key: key.clone() })?;

        let pointer = LatestPointer::parse(&bytes).map_err(|reason| {
            warn!(key = %key, reason = %reason, "Corrupt latest pointer");
            ResolveError::InvalidLatest {
                key: key.clone(),
                reason,
            }
        })?;

        let location = canonical_path(kind, id, &pointer.version, file);
        Ok(LatestResolution {
            version: pointer.version,
            location,
        })
    }

    /// Read a versioned artifact.
    pub async fn artifact(
        &self,
        kind: &str,
        id: &str,
        version: &str,
        file: &str,
    ) -> Result<ArtifactResponse, ResolveError> {
        let key = self.keys.artifact(kind, id, version, file);
        debug!(key = %key, "Resolving artifact");

        let object = self
            .blobs
            .get(&key)
            .await?
            .ok_or_else(|| ResolveError::NotFound { key: key.clone() })?;

        let content_type = self
            .content_types
            .resolve(object.metadata.content_type.as_deref(), file)
            .to_string();
        let etag = object.strong_etag();

        Ok(ArtifactResponse {
            key,
            data: object.data,
            content_type,
            metadata: object.metadata,
            etag,
        })
    }
}
