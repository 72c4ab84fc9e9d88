//! Core error types.

use thiserror::Error;

/// Upload validation errors.
///
/// Display strings are served verbatim in API error bodies, so changes here
/// are wire-visible.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("Unsupported file type")]
    UnsupportedFileType,

    #[error("File too large")]
    FileTooLarge,

    #[error("File content does not match type")]
    ContentMismatch,
}

pub type Result<T> = std::result::Result<T, Error>;
