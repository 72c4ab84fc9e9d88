//! File upload handler.

use crate::error::{ApiError, ApiResult};
use crate::metrics::{FILES_UPLOADED, UPLOAD_BYTES};
use crate::response::Reply;
use crate::scan::public_url;
use crate::state::AppState;
use axum::extract::State;
use axum::extract::multipart::{Multipart, MultipartRejection};
use bytes::Bytes;
use locker_core::content::validate_upload;
use locker_core::path::{build_object_key, display_name};
use locker_storage::PutOptions;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Cache policy applied to uploaded objects. Keys embed a millisecond
/// timestamp, so the content under a key never changes.
const UPLOAD_CACHE_CONTROL: &str = "public, max-age=31536000";

fn invalid_form_data() -> ApiError {
    ApiError::BadRequest("Invalid form data".to_string())
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub key: String,
    pub url: Option<String>,
    pub filename: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub content_type: String,
}

/// POST /api/upload - store a multipart file upload.
///
/// Expects a `file` part and an optional `path` part naming the target
/// folder. The stored key is derived from the sanitized path and file name,
/// never taken from the client verbatim.
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Reply<UploadResponse>> {
    let mut multipart = multipart.map_err(|_| invalid_form_data())?;

    let mut file: Option<(String, String, Bytes)> = None;
    let mut base_path = String::new();

    while let Some(field) = multipart.next_field().await.map_err(|_| invalid_form_data())? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "file" => {
                let name = field
                    .file_name()
                    .filter(|n| !n.is_empty())
                    .unwrap_or("upload")
                    .to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(|_| invalid_form_data())?;
                file = Some((name, content_type, data));
            }
            "path" => {
                base_path = field.text().await.map_err(|_| invalid_form_data())?;
            }
            _ => {}
        }
    }

    let Some((name, content_type, data)) = file else {
        return Err(ApiError::BadRequest("File is required".to_string()));
    };

    validate_upload(&content_type, &data, state.config.server.max_upload_size)?;

    let now = OffsetDateTime::now_utc();
    let key = build_object_key(&base_path, &name, now);
    let upload_time = now
        .format(&Rfc3339)
        .map_err(|e| ApiError::Internal(format!("failed to format upload time: {e}")))?;

    let size = data.len() as u64;
    let options = PutOptions {
        content_type: Some(content_type.clone()),
        cache_control: Some(UPLOAD_CACHE_CONTROL.to_string()),
        metadata: vec![
            ("originalName".to_string(), name),
            ("uploadTime".to_string(), upload_time),
            ("size".to_string(), size.to_string()),
        ],
    };
    state.storage.put(&key, data, &options).await?;

    FILES_UPLOADED.inc();
    UPLOAD_BYTES.inc_by(size);
    tracing::info!(key = %key, size, "File uploaded");

    Ok(Reply::Data(UploadResponse {
        url: public_url(state.config.server.public_domain.as_deref(), &key),
        filename: display_name(&key).to_string(),
        size,
        content_type,
        key,
    }))
}
