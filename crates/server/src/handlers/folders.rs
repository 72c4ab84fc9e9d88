//! Folder creation and recursive deletion handlers.

use crate::error::{ApiError, ApiResult};
use crate::handlers::common::parse_json_body;
use crate::response::Reply;
use crate::scan::delete_prefix;
use crate::state::AppState;
use axum::extract::State;
use bytes::Bytes;
use locker_core::path::normalize_folder_path;
use locker_storage::PutOptions;
use serde::Serialize;
use serde_json::Value;

/// Marker object name keeping an otherwise empty folder listable.
const FOLDER_MARKER: &str = ".keep";

fn folder_path(body: &Value) -> ApiResult<String> {
    let raw = body
        .get("path")
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::BadRequest("path is required".to_string()))?;
    let path = normalize_folder_path(raw);
    if path.is_empty() {
        return Err(ApiError::BadRequest("path is required".to_string()));
    }
    Ok(path)
}

#[derive(Debug, Serialize)]
pub struct FolderCreated {
    pub path: String,
}

/// POST /api/folders - create an empty folder marker.
pub async fn create_folder(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Reply<FolderCreated>> {
    let body = parse_json_body(&body)?;
    let path = folder_path(&body)?;

    let marker = format!("{path}{FOLDER_MARKER}");
    let options = PutOptions {
        content_type: Some("text/plain".to_string()),
        ..PutOptions::default()
    };
    state.storage.put(&marker, Bytes::new(), &options).await?;

    tracing::info!(path = %path, "Folder created");
    Ok(Reply::Data(FolderCreated { path }))
}

#[derive(Debug, Serialize)]
pub struct FolderDeleted {
    pub deleted: u64,
    pub path: String,
}

/// DELETE /api/folders - recursively delete everything under a folder.
pub async fn delete_folder(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Reply<FolderDeleted>> {
    let body = parse_json_body(&body)?;
    let path = folder_path(&body)?;

    let deleted = delete_prefix(state.storage.as_ref(), &path).await?;

    tracing::info!(path = %path, deleted, "Folder deleted");
    Ok(Reply::Data(FolderDeleted { deleted, path }))
}
