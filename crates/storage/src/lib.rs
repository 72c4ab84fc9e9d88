//! Object storage backends for the locker.
//!
//! This crate provides:
//! - The [`ObjectStore`] trait: put/get/head/delete plus cursor-paginated,
//!   delimiter-aware listing
//! - Backends: filesystem, S3-compatible, and in-memory
//! - [`from_config`] to construct a backend from configuration

pub mod backends;
pub mod error;
mod paging;
pub mod traits;

pub use backends::filesystem::FilesystemBackend;
pub use backends::memory::MemoryBackend;
pub use backends::s3::S3Backend;
pub use error::{StorageError, StorageResult};
pub use traits::{ListPage, ListRequest, MAX_LIST_LIMIT, ObjectRecord, ObjectStore, PutOptions};

use locker_core::config::StorageConfig;
use std::sync::Arc;

/// Create a storage backend from configuration.
pub async fn from_config(config: &StorageConfig) -> StorageResult<Arc<dyn ObjectStore>> {
    config.validate().map_err(StorageError::Config)?;

    match config {
        StorageConfig::Filesystem { path } => {
            let backend = FilesystemBackend::new(path.clone()).await?;
            Ok(Arc::new(backend))
        }
        StorageConfig::S3 {
            bucket,
            endpoint,
            region,
            prefix,
            access_key_id,
            secret_access_key,
            force_path_style,
        } => {
            let backend = S3Backend::new(
                bucket,
                endpoint.clone(),
                region.clone(),
                prefix.clone(),
                access_key_id.clone(),
                secret_access_key.clone(),
                *force_path_style,
            )
            .await?;
            Ok(Arc::new(backend))
        }
        StorageConfig::Memory => Ok(Arc::new(MemoryBackend::new())),
    }
}
