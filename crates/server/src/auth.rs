//! Authentication middleware and password verification.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use sha2::{Digest, Sha256};

/// Extract bearer token from Authorization header, with surrounding
/// whitespace stripped. Per RFC 6750, the "Bearer" scheme is
/// case-insensitive.
pub(crate) fn extract_bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            if v.len() >= 7 && v[..7].eq_ignore_ascii_case("bearer ") {
                Some(v[7..].trim())
            } else {
                None
            }
        })
}

/// Compare the supplied password against the configured one.
///
/// Both sides are reduced to SHA-256 digests first, so the comparison
/// operates on fixed-size values rather than the raw strings.
pub(crate) fn verify_password(provided: &str, configured: &str) -> bool {
    hash_secret(provided) == hash_secret(configured)
}

fn hash_secret(value: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hasher.finalize().into()
}

/// Middleware guarding the protected API routes.
///
/// Requests without a live session token are rejected with the uniform 401
/// envelope; the handler never runs.
pub async fn auth_middleware(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let token = match extract_bearer_token(&req) {
        Some(token) if !token.is_empty() => token.to_string(),
        _ => return ApiError::Unauthorized.into_response(),
    };

    match state.sessions.validate(&token).await {
        Ok(true) => next.run(req).await,
        Ok(false) => ApiError::Unauthorized.into_response(),
        Err(e) => ApiError::Kv(e).into_response(),
    }
}
