//! Upload history handler.

use crate::error::ApiResult;
use crate::handlers::common::{normalize_prefix, parse_limit};
use crate::response::Reply;
use crate::scan::{FileSummary, collect_history};
use crate::state::AppState;
use axum::extract::{Query, State};
use locker_core::DEFAULT_HISTORY_LIMIT;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub files: Vec<FileSummary>,
    pub total: usize,
    pub has_more: bool,
}

/// GET /api/history - recent uploads under a prefix, newest first.
pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Reply<HistoryResponse>> {
    let limit = parse_limit(query.limit.as_deref(), DEFAULT_HISTORY_LIMIT);
    let prefix = normalize_prefix(query.prefix.as_deref().unwrap_or_default());
    let domain = state.config.server.public_domain.as_deref();

    let scan = collect_history(state.storage.as_ref(), domain, &prefix, limit).await?;

    Ok(Reply::Data(HistoryResponse {
        files: scan.files,
        total: scan.total,
        has_more: scan.has_more,
    }))
}
