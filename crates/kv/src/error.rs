//! KV store error types.

use thiserror::Error;

/// Errors from key-value store operations.
#[derive(Debug, Error)]
pub enum KvError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type KvResult<T> = std::result::Result<T, KvError>;
