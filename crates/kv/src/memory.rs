//! In-memory KV backend.

use crate::error::KvResult;
use crate::store::KvStore;
use async_trait::async_trait;
use dashmap::DashMap;
use std::time::Duration;
use time::OffsetDateTime;

#[derive(Clone, Debug)]
struct Entry {
    value: String,
    expires_at: Option<OffsetDateTime>,
}

impl Entry {
    fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// DashMap-backed store. Expired entries are dropped lazily on read and in
/// bulk by the purge task.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: DashMap<String, Entry>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry count, expired-but-unpurged included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> KvResult<Option<String>> {
        let now = OffsetDateTime::now_utc();
        let expired = match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
            Some(_) => true,
            None => false,
        };
        if expired {
            // Re-check under the shard lock; a concurrent put may have
            // refreshed the entry since the read above.
            self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        }
        Ok(None)
    }

    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> KvResult<()> {
        let expires_at = ttl.map(|ttl| OffsetDateTime::now_utc() + ttl);
        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> KvResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn increment(&self, key: &str, ttl: Duration) -> KvResult<u64> {
        let now = OffsetDateTime::now_utc();
        // The entry guard holds the shard lock, making reset-or-bump atomic.
        let mut entry = self.entries.entry(key.to_string()).or_insert_with(|| Entry {
            value: "0".to_string(),
            expires_at: Some(now + ttl),
        });
        if entry.is_expired(now) {
            entry.value = "0".to_string();
            entry.expires_at = Some(now + ttl);
        }
        let count = entry.value.parse::<u64>().unwrap_or(0) + 1;
        entry.value = count.to_string();
        Ok(count)
    }

    async fn purge_expired(&self) -> KvResult<u64> {
        let now = OffsetDateTime::now_utc();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        Ok(before.saturating_sub(self.entries.len()) as u64)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
