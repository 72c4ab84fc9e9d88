//! Core types shared across the locker crates.
//!
//! This crate provides:
//! - Application configuration
//! - Path and object-key sanitization
//! - Upload content validation and byte formatting

pub mod config;
pub mod content;
pub mod error;
pub mod path;

pub use config::AppConfig;
pub use error::{Error, Result};

/// Default maximum upload size in bytes (10 MiB).
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 10 * 1024 * 1024;

/// Default page size for file listings.
pub const DEFAULT_LIST_LIMIT: usize = 100;

/// Largest page size a listing request may ask for.
pub const MAX_LIST_LIMIT: usize = 1000;

/// Page size used by full-namespace scans (stats, history, folder deletion).
pub const SCAN_PAGE_LIMIT: usize = 1000;

/// Most objects a history scan pulls into memory before sorting.
pub const HISTORY_SCAN_CAP: usize = 2000;

/// Default number of entries returned by the history endpoint.
pub const DEFAULT_HISTORY_LIMIT: usize = 200;

/// Number of recent uploads reported by the stats endpoint.
pub const RECENT_UPLOADS_COUNT: usize = 10;

/// Default session lifetime in seconds (7 days).
pub const DEFAULT_SESSION_TTL_SECS: u64 = 604_800;

/// Default requests admitted per client per rate-limit window.
pub const DEFAULT_RATE_LIMIT: u64 = 100;

/// Default rate-limit window in seconds (1 hour).
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 3600;
