//! Rate limiter behavior over the full middleware stack.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use common::TestServer;
use common::fixtures::json_request;
use serde_json::json;
use std::time::Duration;
use tower::ServiceExt;

/// GET a protected route with an optional client identity header.
async fn get_files(server: &TestServer, token: &str, identity: Option<(&str, &str)>) -> StatusCode {
    let mut builder = Request::builder()
        .method("GET")
        .uri("/api/files")
        .header(header::AUTHORIZATION, format!("Bearer {token}"));
    if let Some((name, value)) = identity {
        builder = builder.header(name, value);
    }
    server
        .router
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
        .status()
}

#[tokio::test]
async fn the_101st_request_in_a_window_is_rejected() {
    let server = TestServer::new().await;
    let token = server.login().await;

    for i in 0..100 {
        assert_eq!(
            get_files(&server, &token, None).await,
            StatusCode::OK,
            "request {i} should be admitted"
        );
    }

    let (status, body) =
        json_request(&server.router, "GET", "/api/files", None, Some(&token)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("Rate limit exceeded"));
}

#[tokio::test]
async fn an_expired_window_starts_a_fresh_count() {
    let server = TestServer::with_config(|config| {
        config.rate_limit.limit = 2;
        config.rate_limit.window_secs = 1;
    })
    .await;
    let token = server.login().await;

    assert_eq!(get_files(&server, &token, None).await, StatusCode::OK);
    assert_eq!(get_files(&server, &token, None).await, StatusCode::OK);
    assert_eq!(
        get_files(&server, &token, None).await,
        StatusCode::TOO_MANY_REQUESTS
    );

    tokio::time::sleep(Duration::from_millis(1100)).await;

    assert_eq!(get_files(&server, &token, None).await, StatusCode::OK);
}

#[tokio::test]
async fn identities_are_counted_separately() {
    let server = TestServer::with_config(|config| {
        config.rate_limit.limit = 1;
    })
    .await;
    let token = server.login().await;

    let alice = Some(("cf-connecting-ip", "203.0.113.1"));
    let bob = Some(("x-forwarded-for", "203.0.113.2, 10.0.0.1"));

    assert_eq!(get_files(&server, &token, alice).await, StatusCode::OK);
    assert_eq!(
        get_files(&server, &token, alice).await,
        StatusCode::TOO_MANY_REQUESTS
    );

    // A different identity still has budget.
    assert_eq!(get_files(&server, &token, bob).await, StatusCode::OK);

    // Unidentifiable clients all draw from the shared `unknown` bucket.
    assert_eq!(get_files(&server, &token, None).await, StatusCode::OK);
    assert_eq!(
        get_files(&server, &token, None).await,
        StatusCode::TOO_MANY_REQUESTS
    );
}

#[tokio::test]
async fn rejection_happens_before_auth() {
    let server = TestServer::with_config(|config| {
        config.rate_limit.limit = 1;
    })
    .await;

    // No token on either request: the first is counted and refused by auth,
    // the second never reaches auth at all.
    let (status, _) = json_request(&server.router, "GET", "/api/files", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = json_request(&server.router, "GET", "/api/files", None, None).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], json!("Rate limit exceeded"));
}

#[tokio::test]
async fn login_is_exempt_from_rate_limiting() {
    let server = TestServer::with_config(|config| {
        config.rate_limit.limit = 1;
    })
    .await;

    // Exhaust the unknown bucket on a protected route.
    let (status, _) = json_request(&server.router, "GET", "/api/files", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = json_request(&server.router, "GET", "/api/files", None, None).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    // Login still works; it sits outside the limited group.
    let token = server.login().await;
    assert!(!token.is_empty());
}

#[tokio::test]
async fn disabled_limiter_admits_everything() {
    let server = TestServer::with_config(|config| {
        config.rate_limit.enabled = false;
        config.rate_limit.limit = 1;
    })
    .await;
    let token = server.login().await;

    for _ in 0..5 {
        assert_eq!(get_files(&server, &token, None).await, StatusCode::OK);
    }
    assert_eq!(
        server.state.kv.get("ratelimit:unknown").await.unwrap(),
        None
    );
}
