//! Shared handler helpers.

use crate::error::{ApiError, ApiResult};
use bytes::Bytes;
use locker_core::MAX_LIST_LIMIT;
use locker_core::path::sanitize_path;
use serde_json::Value;

/// Parse a request body as a JSON value.
///
/// Handlers take raw [`Bytes`] rather than a typed extractor so malformed
/// bodies and missing fields produce distinct messages.
pub(crate) fn parse_json_body(body: &Bytes) -> ApiResult<Value> {
    serde_json::from_slice(body).map_err(|_| ApiError::BadRequest("Invalid JSON body".to_string()))
}

/// Parse a `limit` query parameter.
///
/// Anything that is not a positive integer falls back to `default`; the
/// result is capped at [`MAX_LIST_LIMIT`].
pub(crate) fn parse_limit(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(default)
        .min(MAX_LIST_LIMIT)
}

/// Sanitize a listing prefix, preserving a trailing slash so folder-scoped
/// queries stay folder-scoped.
pub(crate) fn normalize_prefix(raw: &str) -> String {
    let mut prefix = sanitize_path(raw);
    if !prefix.is_empty() && raw.trim().ends_with('/') {
        prefix.push('/');
    }
    prefix
}
