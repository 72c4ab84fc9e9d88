//! Server test utilities.

use crate::common::fixtures::json_request;
use locker_core::AppConfig;
use locker_core::config::StorageConfig;
use locker_kv::{KvStore, MemoryKvStore};
use locker_server::{AppState, create_router};
use locker_storage::{FilesystemBackend, ObjectStore};
use std::sync::Arc;
use tempfile::TempDir;

/// A test server wrapper with all dependencies.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    /// Create a new test server over tempdir storage and an in-memory KV
    /// store.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test server with custom config modifications.
    pub async fn with_config<F>(modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");

        let storage_path = temp_dir.path().join("objects");
        std::fs::create_dir_all(&storage_path).expect("Failed to create storage directory");
        let storage: Arc<dyn ObjectStore> = Arc::new(
            FilesystemBackend::new(storage_path.clone())
                .await
                .expect("Failed to create storage backend"),
        );

        let kv: Arc<dyn KvStore> = Arc::new(MemoryKvStore::new());

        // Test defaults plus the filesystem backend actually wired above.
        let mut config = AppConfig::for_testing();
        config.storage = StorageConfig::Filesystem { path: storage_path };

        modifier(&mut config);

        let state = AppState::new(config, storage, kv);
        let router = create_router(state.clone());

        Self {
            router,
            state,
            _temp_dir: temp_dir,
        }
    }

    /// Direct access to the storage backend for seeding and verification.
    pub fn storage(&self) -> Arc<dyn ObjectStore> {
        self.state.storage.clone()
    }

    /// Log in with the test password and return the issued session token.
    pub async fn login(&self) -> String {
        let (status, body) = json_request(
            &self.router,
            "POST",
            "/api/auth",
            Some(serde_json::json!({"password": "test-password"})),
            None,
        )
        .await;
        assert_eq!(status, axum::http::StatusCode::OK, "login failed: {body}");
        body["token"]
            .as_str()
            .expect("login response missing token")
            .to_string()
    }
}
