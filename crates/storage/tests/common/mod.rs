//! Shared fixtures for backend integration tests.

use locker_storage::{FilesystemBackend, MemoryBackend, ObjectStore};
use std::sync::Arc;
use tempfile::TempDir;

/// A backend under test plus whatever keeps it alive.
pub struct BackendFixture {
    pub name: &'static str,
    pub store: Arc<dyn ObjectStore>,
    _temp_dir: Option<TempDir>,
}

/// Every backend that can run without external services.
pub async fn backend_fixtures() -> Vec<BackendFixture> {
    let temp_dir = TempDir::new().unwrap();
    let filesystem = FilesystemBackend::new(temp_dir.path().to_path_buf())
        .await
        .unwrap();

    vec![
        BackendFixture {
            name: "memory",
            store: Arc::new(MemoryBackend::new()),
            _temp_dir: None,
        },
        BackendFixture {
            name: "filesystem",
            store: Arc::new(filesystem),
            _temp_dir: Some(temp_dir),
        },
    ]
}
