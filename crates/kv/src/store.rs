//! Key-value store trait.

use crate::error::KvResult;
use async_trait::async_trait;
use std::time::Duration;

/// TTL'd key-value store backing sessions and rate-limit counters.
///
/// Expired entries are indistinguishable from absent ones on read; physical
/// removal may lag until a purge pass.
#[async_trait]
pub trait KvStore: Send + Sync + 'static {
    /// Fetch a live value. Expired entries read as `None`.
    async fn get(&self, key: &str) -> KvResult<Option<String>>;

    /// Store a value, replacing any previous one. `None` means no expiry.
    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> KvResult<()>;

    /// Remove a key. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> KvResult<()>;

    /// Atomically count a hit against a fixed window.
    ///
    /// An absent or expired key restarts the window: the count becomes 1 and
    /// the entry expires `ttl` from now. A live key is bumped without
    /// touching its expiry, so a window always ends `ttl` after its first
    /// hit regardless of traffic.
    async fn increment(&self, key: &str, ttl: Duration) -> KvResult<u64>;

    /// Physically remove expired entries, returning how many went away.
    async fn purge_expired(&self) -> KvResult<u64>;

    /// Static identifier for metrics and logging.
    fn backend_name(&self) -> &'static str;

    /// Verify the backing store is usable.
    async fn health_check(&self) -> KvResult<()> {
        Ok(())
    }
}
