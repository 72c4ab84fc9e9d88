//! Storage stats handler.

use crate::error::ApiResult;
use crate::response::Reply;
use crate::scan::{RecentUpload, collect_stats};
use crate::state::AppState;
use axum::extract::State;
use locker_core::content::format_bytes;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_files: u64,
    pub total_size: u64,
    pub total_size_formatted: String,
    pub recent_uploads: Vec<RecentUpload>,
}

/// GET /api/stats - aggregate totals over the whole namespace.
///
/// Walks every listing page, so cost grows with the number of stored
/// objects.
pub async fn get_stats(State(state): State<AppState>) -> ApiResult<Reply<StatsResponse>> {
    let scan = collect_stats(state.storage.as_ref()).await?;

    Ok(Reply::Data(StatsResponse {
        total_files: scan.total_files,
        total_size: scan.total_size,
        total_size_formatted: format_bytes(scan.total_size),
        recent_uploads: scan.recent_uploads,
    }))
}
