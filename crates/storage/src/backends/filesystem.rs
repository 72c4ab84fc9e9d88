//! Filesystem storage backend.

use crate::error::{StorageError, StorageResult};
use crate::paging::assemble_page;
use crate::traits::{ListPage, ListRequest, ObjectRecord, ObjectStore, PutOptions};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use time::OffsetDateTime;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::instrument;
use uuid::Uuid;

/// Stores objects as plain files under a root directory.
///
/// Keys map directly to relative paths. Content type and custom metadata
/// from [`PutOptions`] have nowhere to live on a plain filesystem and are
/// discarded; listings report modification time as the upload time.
#[derive(Debug)]
pub struct FilesystemBackend {
    root: PathBuf,
}

impl FilesystemBackend {
    /// Create a backend rooted at `root`, creating the directory if needed.
    pub async fn new(root: PathBuf) -> StorageResult<Self> {
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// Resolve a key to a path under the root, rejecting traversal attempts.
    fn key_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey("empty key".to_string()));
        }
        if key.contains("..") || key.starts_with('/') || key.starts_with('\\') {
            return Err(StorageError::InvalidKey(format!(
                "path traversal not allowed: {key}"
            )));
        }
        for component in Path::new(key).components() {
            match component {
                Component::Normal(_) => {}
                _ => {
                    return Err(StorageError::InvalidKey(format!(
                        "unsafe path component in key: {key}"
                    )));
                }
            }
        }
        Ok(self.root.join(key))
    }

    async fn ensure_parent(path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for FilesystemBackend {
    #[instrument(skip(self, data), fields(backend = "filesystem", size = data.len()))]
    async fn put(&self, key: &str, data: Bytes, _options: &PutOptions) -> StorageResult<()> {
        let path = self.key_path(key)?;
        Self::ensure_parent(&path).await?;

        // Write to a temp sibling and rename so readers never observe a
        // partial object.
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let temp_path = path.with_file_name(format!(".tmp.{}.{}", Uuid::new_v4(), file_name));

        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(&data).await?;
        file.sync_all().await?;
        drop(file);

        if let Err(e) = fs::rename(&temp_path, &path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(StorageError::Io(e));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        let path = self.key_path(key)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn head(&self, key: &str) -> StorageResult<ObjectRecord> {
        let path = self.key_path(key)?;
        match fs::metadata(&path).await {
            Ok(metadata) => Ok(ObjectRecord {
                key: key.to_string(),
                size: metadata.len(),
                uploaded: metadata.modified().ok().map(OffsetDateTime::from),
                content_type: None,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn list(&self, request: &ListRequest) -> StorageResult<ListPage> {
        let mut records = Vec::new();
        let mut stack = vec![self.root.clone()];

        while let Some(dir) = stack.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(StorageError::Io(e)),
            };

            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                // file_type() instead of path.is_dir() so symlinks are never
                // followed out of the root.
                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    stack.push(path);
                } else if file_type.is_file() {
                    let Ok(rel) = path.strip_prefix(&self.root) else {
                        continue;
                    };
                    let key = rel.to_string_lossy().to_string();
                    if !key.starts_with(&request.prefix) {
                        continue;
                    }
                    // Skip in-flight temp files from concurrent puts.
                    if rel
                        .file_name()
                        .is_some_and(|n| n.to_string_lossy().starts_with(".tmp."))
                    {
                        continue;
                    }
                    let metadata = entry.metadata().await?;
                    records.push(ObjectRecord {
                        key,
                        size: metadata.len(),
                        uploaded: metadata.modified().ok().map(OffsetDateTime::from),
                        content_type: None,
                    });
                }
            }
        }

        records.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(assemble_page(records, request))
    }

    fn backend_name(&self) -> &'static str {
        "filesystem"
    }

    async fn health_check(&self) -> StorageResult<()> {
        let metadata = fs::metadata(&self.root).await?;
        if !metadata.is_dir() {
            return Err(StorageError::Config(format!(
                "storage root is not a directory: {}",
                self.root.display()
            )));
        }
        Ok(())
    }
}
