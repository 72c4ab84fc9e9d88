//! Object store trait definitions.

use crate::error::StorageResult;
use async_trait::async_trait;
use bytes::Bytes;
use time::OffsetDateTime;

pub use locker_core::MAX_LIST_LIMIT;

/// Options applied to an object on put.
///
/// Backends without native metadata support (the filesystem backend) accept
/// and discard these.
#[derive(Clone, Debug, Default)]
pub struct PutOptions {
    pub content_type: Option<String>,
    pub cache_control: Option<String>,
    /// Custom metadata pairs stored alongside the object.
    pub metadata: Vec<(String, String)>,
}

/// A single cursor-driven listing request.
#[derive(Clone, Debug)]
pub struct ListRequest {
    /// Raw string prefix keys must start with. Not required to align with
    /// delimiter boundaries.
    pub prefix: String,
    /// Opaque cursor from a previous truncated page.
    pub cursor: Option<String>,
    /// Requested page size; clamped to [`MAX_LIST_LIMIT`].
    pub limit: usize,
    /// When set, keys containing the delimiter past the prefix are grouped
    /// into `delimited_prefixes` instead of being listed individually.
    pub delimiter: Option<String>,
}

impl ListRequest {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            cursor: None,
            limit: MAX_LIST_LIMIT,
            delimiter: None,
        }
    }

    /// Page size clamped to backend bounds.
    pub fn normalized_limit(&self) -> usize {
        self.limit.clamp(1, MAX_LIST_LIMIT)
    }
}

/// One page of listing results.
#[derive(Clone, Debug, Default)]
pub struct ListPage {
    pub objects: Vec<ObjectRecord>,
    /// Distinct delimiter groups on this page, each ending in the delimiter.
    pub delimited_prefixes: Vec<String>,
    /// Whether more entries remain past this page.
    pub truncated: bool,
    /// Cursor resuming after this page; set only when `truncated`.
    pub cursor: Option<String>,
}

/// Metadata view of a stored object.
#[derive(Clone, Debug)]
pub struct ObjectRecord {
    pub key: String,
    pub size: u64,
    /// Upload time, where the backend tracks one.
    pub uploaded: Option<OffsetDateTime>,
    /// Declared content type, where the backend stores one.
    pub content_type: Option<String>,
}

/// Abstraction over object storage backends.
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Store an object atomically under `key`.
    async fn put(&self, key: &str, data: Bytes, options: &PutOptions) -> StorageResult<()>;

    /// Fetch an object's content.
    async fn get(&self, key: &str) -> StorageResult<Bytes>;

    /// Fetch an object's metadata without its content.
    async fn head(&self, key: &str) -> StorageResult<ObjectRecord>;

    /// Delete an object. Deleting an absent key succeeds.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Fetch one page of entries under a prefix.
    ///
    /// Entries come back in lexicographic key order, with delimiter groups
    /// interleaved at the position of their first member.
    async fn list(&self, request: &ListRequest) -> StorageResult<ListPage>;

    /// Static identifier for metrics and logging.
    fn backend_name(&self) -> &'static str;

    /// Verify the backend is reachable and usable.
    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }
}
