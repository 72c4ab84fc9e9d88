//! Static asset fallback for requests matching no API route.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};

/// Fallback handler for unmatched paths.
///
/// GET requests are served from the configured asset directory; any other
/// method, a missing asset, or an unconfigured directory yields the JSON
/// 404 envelope.
pub async fn asset_fallback(State(state): State<AppState>, req: Request) -> Response {
    if req.method() != Method::GET {
        return ApiError::NotFound.into_response();
    }

    let Some(mut assets) = state.assets.clone() else {
        return ApiError::NotFound.into_response();
    };

    match assets.try_call(req).await {
        Ok(response) if response.status() != StatusCode::NOT_FOUND => response.into_response(),
        Ok(_) => ApiError::NotFound.into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to serve static asset");
            ApiError::NotFound.into_response()
        }
    }
}
