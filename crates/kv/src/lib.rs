//! TTL'd key-value storage for sessions and rate-limit counters.
//!
//! This crate provides:
//! - The [`KvStore`] trait: get/put with TTL, delete, and an atomic
//!   fixed-window increment
//! - Backends: in-memory (DashMap) and SQLite
//! - A background purge task sweeping expired entries

pub mod error;
pub mod memory;
pub mod sqlite;
pub mod store;

pub use error::{KvError, KvResult};
pub use memory::MemoryKvStore;
pub use sqlite::SqliteKvStore;
pub use store::KvStore;

use locker_core::config::KvConfig;
use std::sync::Arc;
use std::time::Duration;

/// Create a KV store from configuration.
pub async fn from_config(config: &KvConfig) -> KvResult<Arc<dyn KvStore>> {
    match config {
        KvConfig::Memory { .. } => Ok(Arc::new(MemoryKvStore::new())),
        KvConfig::Sqlite { path, .. } => {
            let store = SqliteKvStore::new(path).await?;
            Ok(Arc::new(store))
        }
    }
}

/// Spawn a background task that periodically sweeps expired entries.
///
/// Reads already treat expired entries as absent; the sweep only reclaims
/// space. A zero interval falls back to 60 seconds since tokio intervals
/// panic on zero.
pub fn spawn_purge_task(
    store: Arc<dyn KvStore>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    let interval = if interval.is_zero() {
        tracing::warn!("kv purge interval is 0, using 60s");
        Duration::from_secs(60)
    } else {
        interval
    };

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match store.purge_expired().await {
                Ok(0) => {}
                Ok(purged) => {
                    tracing::debug!(
                        purged,
                        backend = store.backend_name(),
                        "Purged expired kv entries"
                    );
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to purge expired kv entries");
                }
            }
        }
    })
}
