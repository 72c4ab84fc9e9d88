//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// HTTP server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Public base URL under which uploaded objects are reachable, e.g. a CDN
    /// domain in front of the bucket. When unset, responses omit URLs.
    #[serde(default)]
    pub public_domain: Option<String>,

    /// Maximum accepted upload size in bytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,

    /// Enable the /metrics endpoint for Prometheus scraping (default: true).
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_max_upload_size() -> u64 {
    crate::DEFAULT_MAX_UPLOAD_SIZE
}

fn default_metrics_enabled() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            public_domain: None,
            max_upload_size: default_max_upload_size(),
            metrics_enabled: default_metrics_enabled(),
        }
    }
}

/// Login and session configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared access password. When unset, the server starts but every login
    /// attempt fails with a misconfiguration error.
    #[serde(default)]
    pub password: Option<String>,

    /// Session lifetime in seconds.
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
}

fn default_session_ttl_secs() -> u64 {
    crate::DEFAULT_SESSION_TTL_SECS
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            password: None,
            session_ttl_secs: default_session_ttl_secs(),
        }
    }
}

impl AuthConfig {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    /// Create a test configuration with a fixed password.
    pub fn for_testing() -> Self {
        Self {
            password: Some("test-password".to_string()),
            session_ttl_secs: default_session_ttl_secs(),
        }
    }

    /// Validate auth configuration.
    ///
    /// Returns warnings for configs that are risky but allowed, and errors
    /// for configs that are unusable.
    pub fn validate(&self) -> Result<Vec<String>, String> {
        let mut warnings = Vec::new();

        if self.password.is_none() {
            warnings.push(
                "auth.password is not set; every login attempt will fail until it is configured"
                    .to_string(),
            );
        }

        if self.session_ttl_secs == 0 {
            return Err(
                "auth.session_ttl_secs cannot be 0; sessions would expire immediately".to_string(),
            );
        }

        Ok(warnings)
    }
}

/// Per-client rate limit configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Enable rate limiting (default: true).
    #[serde(default = "default_rate_limit_enabled")]
    pub enabled: bool,

    /// Requests admitted per client per window.
    #[serde(default = "default_rate_limit")]
    pub limit: u64,

    /// Fixed window length in seconds.
    #[serde(default = "default_rate_limit_window_secs")]
    pub window_secs: u64,
}

fn default_rate_limit_enabled() -> bool {
    true
}

fn default_rate_limit() -> u64 {
    crate::DEFAULT_RATE_LIMIT
}

fn default_rate_limit_window_secs() -> u64 {
    crate::DEFAULT_RATE_LIMIT_WINDOW_SECS
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_rate_limit_enabled(),
            limit: default_rate_limit(),
            window_secs: default_rate_limit_window_secs(),
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    /// Validate rate limit configuration.
    ///
    /// Returns warnings for configs that are risky but allowed, and errors
    /// for configs that are unusable.
    pub fn validate(&self) -> Result<Vec<String>, String> {
        let mut warnings = Vec::new();

        if !self.enabled {
            return Ok(warnings);
        }

        if self.limit == 0 {
            return Err(
                "rate_limit.limit cannot be 0 while rate limiting is enabled; every request would be rejected"
                    .to_string(),
            );
        }

        if self.window_secs == 0 {
            return Err(
                "rate_limit.window_secs cannot be 0; counters would expire before the next request"
                    .to_string(),
            );
        }

        if self.window_secs < 60 {
            warnings.push(format!(
                "rate_limit.window_secs={} is very short; counters reset on window expiry, so short windows make the limit easy to outpace",
                self.window_secs
            ));
        }

        Ok(warnings)
    }
}

/// Object storage backend configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Local filesystem storage.
    Filesystem {
        /// Root directory for stored objects.
        path: PathBuf,
    },
    /// S3-compatible object storage (AWS S3, R2, MinIO, etc).
    S3 {
        /// Bucket name.
        bucket: String,
        /// Custom endpoint URL (for R2, MinIO, etc). Uses AWS default when unset.
        #[serde(default)]
        endpoint: Option<String>,
        /// AWS region. Defaults to us-east-1 for S3-compatible services.
        #[serde(default)]
        region: Option<String>,
        /// Key prefix within the bucket.
        #[serde(default)]
        prefix: Option<String>,
        /// Static access key ID. Falls back to the AWS credential chain when unset.
        #[serde(default)]
        access_key_id: Option<String>,
        /// Static secret access key. Falls back to the AWS credential chain when unset.
        #[serde(default)]
        secret_access_key: Option<String>,
        /// Use path-style addressing (required for MinIO).
        #[serde(default)]
        force_path_style: bool,
    },
    /// In-memory storage for tests and ephemeral deployments.
    Memory,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::Filesystem {
            path: PathBuf::from("./data/objects"),
        }
    }
}

impl StorageConfig {
    /// Validate storage configuration.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::Filesystem { path } => {
                if path.as_os_str().is_empty() {
                    return Err("storage.path cannot be empty".to_string());
                }
                Ok(())
            }
            Self::S3 {
                bucket,
                access_key_id,
                secret_access_key,
                ..
            } => {
                if bucket.is_empty() {
                    return Err("storage.bucket cannot be empty".to_string());
                }
                if access_key_id.is_some() != secret_access_key.is_some() {
                    return Err(
                        "storage requires both access_key_id and secret_access_key when either is set"
                            .to_string(),
                    );
                }
                Ok(())
            }
            Self::Memory => Ok(()),
        }
    }
}

/// Session and rate-limit store configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum KvConfig {
    /// In-memory store. Sessions and counters are lost on restart.
    Memory {
        #[serde(default = "default_purge_interval_secs")]
        purge_interval_secs: u64,
    },
    /// SQLite-backed store.
    Sqlite {
        /// Database file path.
        path: PathBuf,
        #[serde(default = "default_purge_interval_secs")]
        purge_interval_secs: u64,
    },
}

fn default_purge_interval_secs() -> u64 {
    60
}

impl Default for KvConfig {
    fn default() -> Self {
        Self::Sqlite {
            path: PathBuf::from("./data/kv.db"),
            purge_interval_secs: default_purge_interval_secs(),
        }
    }
}

impl KvConfig {
    /// Interval between background sweeps of expired entries.
    pub fn purge_interval(&self) -> Duration {
        let secs = match self {
            Self::Memory {
                purge_interval_secs,
            }
            | Self::Sqlite {
                purge_interval_secs,
                ..
            } => *purge_interval_secs,
        };
        Duration::from_secs(secs)
    }
}

/// Static asset serving configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// Directory served for GET requests that match no API route.
    pub path: PathBuf,
}

/// Top-level application configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub kv: KvConfig,

    /// Static asset serving (optional).
    #[serde(default)]
    pub assets: Option<AssetsConfig>,
}

impl AppConfig {
    /// Create a test configuration: memory backends and a fixed password.
    pub fn for_testing() -> Self {
        Self {
            server: ServerConfig::default(),
            auth: AuthConfig::for_testing(),
            rate_limit: RateLimitConfig::default(),
            storage: StorageConfig::Memory,
            kv: KvConfig::Memory {
                purge_interval_secs: default_purge_interval_secs(),
            },
            assets: None,
        }
    }
}
