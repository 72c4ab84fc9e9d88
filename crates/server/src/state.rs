//! Application state shared across handlers.

use crate::sessions::SessionStore;
use locker_core::AppConfig;
use locker_kv::KvStore;
use locker_storage::ObjectStore;
use std::sync::Arc;
use tower_http::services::ServeDir;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Object storage backend.
    pub storage: Arc<dyn ObjectStore>,
    /// TTL'd store backing sessions and rate-limit counters.
    pub kv: Arc<dyn KvStore>,
    /// Session issue and validation on top of the KV store.
    pub sessions: SessionStore,
    /// Static asset service, when configured.
    pub assets: Option<ServeDir>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// This performs configuration validation and logs warnings for potentially
    /// dangerous settings. Panics if configuration is invalid.
    ///
    /// # Panics
    ///
    /// Panics if auth or rate limit configuration validation fails with an
    /// error.
    pub fn new(config: AppConfig, storage: Arc<dyn ObjectStore>, kv: Arc<dyn KvStore>) -> Self {
        // Validate configuration - fail fast on errors, log warnings
        match config.auth.validate() {
            Ok(warnings) => {
                for warning in warnings {
                    tracing::warn!("Configuration warning: {}", warning);
                }
            }
            Err(error) => {
                panic!("Invalid auth configuration: {}", error);
            }
        }

        match config.rate_limit.validate() {
            Ok(warnings) => {
                for warning in warnings {
                    tracing::warn!("Configuration warning: {}", warning);
                }
            }
            Err(error) => {
                panic!("Invalid rate limit configuration: {}", error);
            }
        }

        let sessions = SessionStore::new(kv.clone(), config.auth.session_ttl());
        let assets = config.assets.as_ref().map(|a| ServeDir::new(&a.path));

        Self {
            config: Arc::new(config),
            storage,
            kv,
            sessions,
            assets,
        }
    }
}
