//! Fixed-window rate limiting keyed on client identity.

use crate::error::ApiError;
use crate::metrics::RATE_LIMITED_REQUESTS;
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

const RATE_LIMIT_KEY_PREFIX: &str = "ratelimit:";

/// Resolve the identity a request is counted against.
///
/// `cf-connecting-ip` wins when present; otherwise the first hop of
/// `x-forwarded-for` is used. Requests carrying neither header share the
/// `unknown` bucket.
pub(crate) fn client_identity(req: &Request) -> String {
    if let Some(value) = req.headers().get("cf-connecting-ip")
        && let Ok(ip) = value.to_str()
    {
        let ip = ip.trim();
        if !ip.is_empty() {
            return ip.to_string();
        }
    }

    if let Some(value) = req.headers().get("x-forwarded-for")
        && let Ok(chain) = value.to_str()
        && let Some(first) = chain.split(',').next()
    {
        let first = first.trim();
        if !first.is_empty() {
            return first.to_string();
        }
    }

    "unknown".to_string()
}

/// Middleware enforcing the per-identity request budget.
///
/// Each request increments the window counter before the admit decision, so
/// rejected requests still consume budget.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    if !state.config.rate_limit.enabled {
        return next.run(req).await;
    }

    let identity = client_identity(&req);
    let key = format!("{RATE_LIMIT_KEY_PREFIX}{identity}");

    let count = match state.kv.increment(&key, state.config.rate_limit.window()).await {
        Ok(count) => count,
        Err(e) => return ApiError::Kv(e).into_response(),
    };

    if count > state.config.rate_limit.limit {
        RATE_LIMITED_REQUESTS.inc();
        tracing::debug!(identity = %identity, count, "Rate limit exceeded");
        return ApiError::RateLimited.into_response();
    }

    next.run(req).await
}
