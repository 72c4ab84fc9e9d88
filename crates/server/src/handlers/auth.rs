//! Login handler.

use crate::auth::verify_password;
use crate::error::{ApiError, ApiResult};
use crate::handlers::common::parse_json_body;
use crate::metrics::SESSIONS_ISSUED;
use crate::response::Reply;
use crate::state::AppState;
use axum::extract::State;
use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// POST /api/auth - exchange the access password for a session token.
pub async fn login(State(state): State<AppState>, body: Bytes) -> ApiResult<Reply<LoginResponse>> {
    let body = parse_json_body(&body)?;
    let provided = body
        .get("password")
        .and_then(Value::as_str)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Password is required".to_string()))?;

    let Some(configured) = state.config.auth.password.as_deref() else {
        tracing::warn!("Login attempted but auth.password is not configured");
        return Err(ApiError::Misconfiguration);
    };

    if !verify_password(provided, configured) {
        return Err(ApiError::InvalidPassword);
    }

    let token = state.sessions.create().await?;
    SESSIONS_ISSUED.inc();
    tracing::info!("Session issued");

    Ok(Reply::Raw(LoginResponse { token }))
}
