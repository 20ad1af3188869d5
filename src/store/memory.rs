use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use bytes::Bytes;
use sha2::{Digest, Sha256};

use super::{BlobObject, BlobStore, KvStore};
use crate::error::StoreError;

/// In-memory store implementing both [`KvStore`] and [`BlobStore`].
///
/// Objects inserted without an etag get one derived from the SHA-256 of
/// their bytes. Clones share the same underlying map.
#[derive(Clone, Default)]
pub struct MemoryStore {
    objects: Arc<RwLock<HashMap<String, BlobObject>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of raw bytes.
    pub fn with(self, key: impl Into<String>, data: impl Into<Bytes>) -> Self {
        self.insert(key, BlobObject::new(data));
        self
    }

    /// Builder-style insert of a full object.
    pub fn with_object(self, key: impl Into<String>, object: BlobObject) -> Self {
        self.insert(key, object);
        self
    }

    /// Insert or replace an object.
    pub fn insert(&self, key: impl Into<String>, mut object: BlobObject) {
        if object.etag.is_none() {
            object.etag = Some(hex::encode(Sha256::digest(&object.data)));
        }

        if let Ok(mut objects) = self.objects.write() {
            objects.insert(key.into(), object);
        }
    }

    pub fn remove(&self, key: &str) -> Option<BlobObject> {
        self.objects.write().ok()?.remove(key)
    }

    pub fn len(&self) -> usize {
        self.objects.read().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, key: &str) -> Result<Option<BlobObject>, StoreError> {
        let objects = self
            .objects
            .read()
            .map_err(|e| StoreError::S3(format!("memory store poisoned: {}", e)))?;
        Ok(objects.get(key).cloned())
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        Ok(self.lookup(key)?.map(|object| object.data))
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<BlobObject>, StoreError> {
        self.lookup(key)
    }
}
