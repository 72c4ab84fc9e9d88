//! Route configuration.

use crate::assets::asset_fallback;
use crate::auth::auth_middleware;
use crate::cors::cors_middleware;
use crate::error::ApiError;
use crate::handlers;
use crate::metrics::{metrics_handler, track_requests};
use crate::ratelimit::rate_limit_middleware;
use crate::state::AppState;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

/// Headroom on top of the configured maximum file size for multipart
/// framing and the other form fields.
const UPLOAD_BODY_OVERHEAD: usize = 64 * 1024;

/// Known path hit with an unregistered method.
async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::MethodNotAllowed(method.to_string())
}

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    // Login is reachable without a session and is exempt from rate limiting.
    let public_routes = Router::new()
        .route("/api/auth", post(handlers::login))
        .method_not_allowed_fallback(method_not_allowed);

    // The body cap only needs to stop runaway requests; oversized files
    // within it still reach the handler and fail validation with a 400.
    let body_limit = 2 * state.config.server.max_upload_size as usize + UPLOAD_BODY_OVERHEAD;

    // Method fallbacks are registered before the layers so a wrong method on
    // a known path still passes rate limiting and auth first.
    let protected_routes = Router::new()
        .route("/api/upload", post(handlers::upload_file))
        .route(
            "/api/files",
            get(handlers::list_files).delete(handlers::delete_files),
        )
        .route(
            "/api/folders",
            post(handlers::create_folder).delete(handlers::delete_folder),
        )
        .route("/api/stats", get(handlers::get_stats))
        .route("/api/history", get(handlers::get_history))
        .method_not_allowed_fallback(method_not_allowed)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    let mut router = Router::new().merge(public_routes).merge(protected_routes);

    // Conditionally add metrics endpoint based on config.
    // SECURITY: When enabled, this endpoint MUST be network-restricted
    // to authorized Prometheus scraper IPs only.
    // See crate::metrics module documentation for details.
    if state.config.server.metrics_enabled {
        let metrics_routes = Router::new().route("/metrics", get(metrics_handler));
        router = router.merge(metrics_routes);
    }

    // Middleware layers are applied in reverse order (outermost first).
    // Order of execution: CORS -> request metrics -> TraceLayer -> routes,
    // with rate limiting and auth layered onto the protected group above.
    router
        .fallback(asset_fallback)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(track_requests))
        .layer(middleware::from_fn(cors_middleware))
        .with_state(state)
}
