//! File listing and deletion handlers.

use crate::error::{ApiError, ApiResult};
use crate::handlers::common::{normalize_prefix, parse_json_body, parse_limit};
use crate::response::Reply;
use crate::scan::{FileSummary, file_summary};
use crate::state::AppState;
use axum::extract::{Query, State};
use bytes::Bytes;
use futures::future::join_all;
use locker_core::DEFAULT_LIST_LIMIT;
use locker_core::path::sanitize_path;
use locker_storage::ListRequest;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
    #[serde(default)]
    pub cursor: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FileListing {
    pub files: Vec<FileSummary>,
    pub folders: Vec<String>,
    pub truncated: bool,
    pub cursor: Option<String>,
}

/// GET /api/files - one page of files and folders under a prefix.
pub async fn list_files(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Reply<FileListing>> {
    let limit = parse_limit(query.limit.as_deref(), DEFAULT_LIST_LIMIT);
    let request = ListRequest {
        prefix: normalize_prefix(query.prefix.as_deref().unwrap_or_default()),
        cursor: query.cursor,
        limit,
        delimiter: Some("/".to_string()),
    };

    let page = state.storage.list(&request).await?;
    let domain = state.config.server.public_domain.as_deref();
    let files = page
        .objects
        .iter()
        .map(|record| file_summary(record, domain))
        .collect();

    Ok(Reply::Data(FileListing {
        files,
        folders: page.delimited_prefixes,
        truncated: page.truncated,
        cursor: page.cursor,
    }))
}

#[derive(Debug, Serialize)]
pub struct DeleteResult {
    pub deleted: usize,
    pub failed: Vec<String>,
}

/// DELETE /api/files - delete a set of keys.
///
/// Deletes run concurrently with no ordering; `deleted` counts attempts and
/// per-key failures are listed under `failed`.
pub async fn delete_files(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Reply<DeleteResult>> {
    let body = parse_json_body(&body)?;
    let keys: Vec<String> = body
        .get("keys")
        .and_then(Value::as_array)
        .filter(|keys| !keys.is_empty())
        .and_then(|keys| {
            keys.iter()
                .map(|k| k.as_str().map(sanitize_path))
                .collect::<Option<Vec<_>>>()
        })
        .ok_or_else(|| ApiError::BadRequest("keys must be a non-empty array".to_string()))?;

    let results = join_all(keys.iter().map(|key| state.storage.delete(key))).await;

    let mut failed = Vec::new();
    for (key, result) in keys.iter().zip(results) {
        if let Err(e) = result {
            tracing::warn!(key = %key, error = %e, "Failed to delete object");
            failed.push(key.clone());
        }
    }

    tracing::info!(
        attempted = keys.len(),
        failed = failed.len(),
        "Files deleted"
    );

    Ok(Reply::Data(DeleteResult {
        deleted: keys.len(),
        failed,
    }))
}
