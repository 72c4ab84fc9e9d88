//! In-memory storage backend.

use crate::error::{StorageError, StorageResult};
use crate::paging::assemble_page;
use crate::traits::{ListPage, ListRequest, ObjectRecord, ObjectStore, PutOptions};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::sync::RwLock;
use time::OffsetDateTime;

#[derive(Clone)]
struct StoredObject {
    data: Bytes,
    content_type: Option<String>,
    cache_control: Option<String>,
    metadata: Vec<(String, String)>,
    uploaded: Option<OffsetDateTime>,
}

/// Keeps every object in a sorted map. Used by tests and ephemeral
/// deployments; nothing survives a restart.
#[derive(Default)]
pub struct MemoryBackend {
    objects: RwLock<BTreeMap<String, StoredObject>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an object with an explicit upload time. Tests use this to pin
    /// timestamps that the trait's `put` would take from the clock.
    pub fn put_at(
        &self,
        key: &str,
        data: Bytes,
        options: &PutOptions,
        uploaded: Option<OffsetDateTime>,
    ) {
        let mut objects = self.objects.write().expect("object map lock poisoned");
        objects.insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: options.content_type.clone(),
                cache_control: options.cache_control.clone(),
                metadata: options.metadata.clone(),
                uploaded,
            },
        );
    }

    /// Stored cache-control header for a key, if any.
    pub fn cache_control(&self, key: &str) -> Option<String> {
        let objects = self.objects.read().expect("object map lock poisoned");
        objects.get(key).and_then(|o| o.cache_control.clone())
    }

    /// Stored custom metadata for a key.
    pub fn metadata(&self, key: &str) -> Option<Vec<(String, String)>> {
        let objects = self.objects.read().expect("object map lock poisoned");
        objects.get(key).map(|o| o.metadata.clone())
    }

    pub fn len(&self) -> usize {
        self.objects.read().expect("object map lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ObjectStore for MemoryBackend {
    async fn put(&self, key: &str, data: Bytes, options: &PutOptions) -> StorageResult<()> {
        self.put_at(key, data, options, Some(OffsetDateTime::now_utc()));
        Ok(())
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        let objects = self.objects.read().expect("object map lock poisoned");
        objects
            .get(key)
            .map(|o| o.data.clone())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn head(&self, key: &str) -> StorageResult<ObjectRecord> {
        let objects = self.objects.read().expect("object map lock poisoned");
        objects
            .get(key)
            .map(|o| ObjectRecord {
                key: key.to_string(),
                size: o.data.len() as u64,
                uploaded: o.uploaded,
                content_type: o.content_type.clone(),
            })
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let mut objects = self.objects.write().expect("object map lock poisoned");
        objects.remove(key);
        Ok(())
    }

    async fn list(&self, request: &ListRequest) -> StorageResult<ListPage> {
        let records: Vec<ObjectRecord> = {
            let objects = self.objects.read().expect("object map lock poisoned");
            objects
                .range::<str, _>((
                    std::ops::Bound::Included(request.prefix.as_str()),
                    std::ops::Bound::Unbounded,
                ))
                .take_while(|(key, _)| key.starts_with(&request.prefix))
                .map(|(key, stored)| ObjectRecord {
                    key: key.clone(),
                    size: stored.data.len() as u64,
                    uploaded: stored.uploaded,
                    content_type: stored.content_type.clone(),
                })
                .collect()
        };

        Ok(assemble_page(records, request))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
