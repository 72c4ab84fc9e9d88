//! Integration tests for the HTTP API endpoints.

mod common;

use axum::http::StatusCode;
use bytes::Bytes;
use common::TestServer;
use common::fixtures::{json_request, multipart_body, png_bytes, upload_request};
use locker_storage::PutOptions;
use serde_json::json;

#[tokio::test]
async fn login_issues_token_for_correct_password() {
    let server = TestServer::new().await;

    let (status, body) = json_request(
        &server.router,
        "POST",
        "/api/auth",
        Some(json!({"password": "test-password"})),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    let token = body["token"].as_str().unwrap();
    assert!(!token.is_empty());
    // The flattened login response has no data wrapper.
    assert!(body.get("data").is_none());

    // The issued token opens the protected routes.
    let (status, _) = json_request(&server.router, "GET", "/api/files", None, Some(token)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let server = TestServer::new().await;

    let (status, body) = json_request(
        &server.router,
        "POST",
        "/api/auth",
        Some(json!({"password": "nope"})),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("Invalid password"));
}

#[tokio::test]
async fn login_validates_the_request_body() {
    let server = TestServer::new().await;

    for body in [json!({}), json!({"password": ""}), json!({"password": 7})] {
        let (status, response) =
            json_request(&server.router, "POST", "/api/auth", Some(body), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"], json!("Password is required"));
    }
}

#[tokio::test]
async fn login_fails_closed_without_a_configured_password() {
    let server = TestServer::with_config(|config| {
        config.auth.password = None;
    })
    .await;

    let (status, body) = json_request(
        &server.router,
        "POST",
        "/api/auth",
        Some(json!({"password": "anything"})),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], json!("Server misconfiguration"));
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let server = TestServer::new().await;

    for uri in ["/api/files", "/api/stats", "/api/history"] {
        let (status, body) = json_request(&server.router, "GET", uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "no token: {uri}");
        assert_eq!(body["error"], json!("Unauthorized"));

        let (status, _) =
            json_request(&server.router, "GET", uri, None, Some("made-up-token")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "bad token: {uri}");
    }
}

#[tokio::test]
async fn upload_stores_the_file_and_reports_its_key() {
    let server = TestServer::new().await;
    let token = server.login().await;

    let body = multipart_body("My Photo!.png", "image/png", &png_bytes(), Some("photos"));
    let (status, response) = upload_request(&server.router, &token, body).await;

    assert_eq!(status, StatusCode::OK, "upload failed: {response}");
    assert_eq!(response["success"], json!(true));
    let data = &response["data"];
    let key = data["key"].as_str().unwrap();
    assert!(key.starts_with("photos/"), "unexpected key {key}");
    assert!(key.ends_with("-My-Photo-.png"), "unexpected key {key}");
    assert_eq!(data["size"], json!(png_bytes().len()));
    assert_eq!(data["type"], json!("image/png"));
    // No public domain configured, so no URL.
    assert_eq!(data["url"], json!(null));

    let stored = server.storage().get(key).await.unwrap();
    assert_eq!(stored, Bytes::from(png_bytes()));
}

#[tokio::test]
async fn upload_without_a_path_lands_under_a_date_prefix() {
    let server = TestServer::new().await;
    let token = server.login().await;

    let body = multipart_body("pic.png", "image/png", &png_bytes(), None);
    let (status, response) = upload_request(&server.router, &token, body).await;

    assert_eq!(status, StatusCode::OK);
    let key = response["data"]["key"].as_str().unwrap();
    // <year>/<month>/<millis>-pic.png
    let segments: Vec<&str> = key.split('/').collect();
    assert_eq!(segments.len(), 3, "unexpected key {key}");
    assert_eq!(segments[0].len(), 4);
    assert_eq!(segments[1].len(), 2);
    assert!(segments[2].ends_with("-pic.png"));
}

#[tokio::test]
async fn upload_carries_public_urls_when_a_domain_is_configured() {
    let server = TestServer::with_config(|config| {
        config.server.public_domain = Some("https://files.example.com/".to_string());
    })
    .await;
    let token = server.login().await;

    let body = multipart_body("a.png", "image/png", &png_bytes(), Some("photos"));
    let (status, response) = upload_request(&server.router, &token, body).await;

    assert_eq!(status, StatusCode::OK);
    let data = &response["data"];
    let key = data["key"].as_str().unwrap();
    assert_eq!(
        data["url"],
        json!(format!("https://files.example.com/{key}"))
    );
}

#[tokio::test]
async fn upload_requires_a_file_part() {
    let server = TestServer::new().await;
    let token = server.login().await;

    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"path\"\r\n\r\nphotos\r\n--{b}--\r\n",
            b = common::fixtures::MULTIPART_BOUNDARY
        )
        .as_bytes(),
    );
    let (status, response) = upload_request(&server.router, &token, body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], json!("File is required"));
}

#[tokio::test]
async fn upload_rejects_invalid_content() {
    let server = TestServer::new().await;
    let token = server.login().await;

    // Disallowed content type.
    let body = multipart_body("notes.txt", "text/plain", b"hello", None);
    let (status, response) = upload_request(&server.router, &token, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], json!("Unsupported file type"));

    // Declared PNG, actual JPEG bytes.
    let body = multipart_body("fake.png", "image/png", &[0xff, 0xd8, 0xff, 0xe0], None);
    let (status, response) = upload_request(&server.router, &token, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], json!("File content does not match type"));
}

#[tokio::test]
async fn upload_rejects_oversize_files() {
    let server = TestServer::with_config(|config| {
        config.server.max_upload_size = 16;
    })
    .await;
    let token = server.login().await;

    let body = multipart_body("big.png", "image/png", &png_bytes(), None);
    let (status, response) = upload_request(&server.router, &token, body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], json!("File too large"));
}

#[tokio::test]
async fn listing_groups_folders_with_the_delimiter() {
    let server = TestServer::new().await;
    let token = server.login().await;

    let storage = server.storage();
    let options = PutOptions::default();
    for key in ["albums/a.png", "albums/b.png", "docs/c.png", "root.png"] {
        storage
            .put(key, Bytes::from_static(b"x"), &options)
            .await
            .unwrap();
    }

    let (status, body) =
        json_request(&server.router, "GET", "/api/files", None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    let files: Vec<&str> = data["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["key"].as_str().unwrap())
        .collect();
    assert_eq!(files, vec!["root.png"]);
    let folders: Vec<&str> = data["folders"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f.as_str().unwrap())
        .collect();
    assert_eq!(folders, vec!["albums/", "docs/"]);
    assert_eq!(data["truncated"], json!(false));

    // Scoped to one folder.
    let (status, body) = json_request(
        &server.router,
        "GET",
        "/api/files?prefix=albums/",
        None,
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let files = body["data"]["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["name"], json!("a.png"));
}

#[tokio::test]
async fn delete_files_counts_attempts_not_confirmed_deletions() {
    let server = TestServer::new().await;
    let token = server.login().await;

    server
        .storage()
        .put("a.png", Bytes::from_static(b"x"), &PutOptions::default())
        .await
        .unwrap();

    // The same key twice: both attempts count, neither fails, and the
    // backend treats the second delete of a gone key as success.
    let (status, body) = json_request(
        &server.router,
        "DELETE",
        "/api/files",
        Some(json!({"keys": ["a.png", "a.png"]})),
        Some(&token),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deleted"], json!(2));
    assert_eq!(body["data"]["failed"], json!([]));
    assert!(server.storage().get("a.png").await.is_err());
}

#[tokio::test]
async fn delete_files_validates_the_key_list() {
    let server = TestServer::new().await;
    let token = server.login().await;

    for body in [
        json!({}),
        json!({"keys": []}),
        json!({"keys": "a.png"}),
        json!({"keys": [1, 2]}),
    ] {
        let (status, response) = json_request(
            &server.router,
            "DELETE",
            "/api/files",
            Some(body),
            Some(&token),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"], json!("keys must be a non-empty array"));
    }
}

#[tokio::test]
async fn stats_totals_cover_every_object() {
    let server = TestServer::new().await;
    let token = server.login().await;

    let storage = server.storage();
    for (key, size) in [("a.png", 1usize), ("b/c.png", 2), ("b/d.png", 3)] {
        storage
            .put(key, Bytes::from(vec![0u8; size]), &PutOptions::default())
            .await
            .unwrap();
    }

    let (status, body) =
        json_request(&server.router, "GET", "/api/stats", None, Some(&token)).await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["totalFiles"], json!(3));
    assert_eq!(data["totalSize"], json!(6));
    assert_eq!(data["totalSizeFormatted"], json!("6.00 B"));
    assert_eq!(data["recentUploads"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn history_pools_and_truncates_to_the_limit() {
    let server = TestServer::new().await;
    let token = server.login().await;

    let storage = server.storage();
    for i in 0..3 {
        storage
            .put(
                &format!("h/{i}.png"),
                Bytes::from_static(b"x"),
                &PutOptions::default(),
            )
            .await
            .unwrap();
    }

    let (status, body) = json_request(
        &server.router,
        "GET",
        "/api/history?limit=2",
        None,
        Some(&token),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["files"].as_array().unwrap().len(), 2);
    assert_eq!(data["total"], json!(3));
    // The pool held more than the limit, so the flag is set even though the
    // scan itself finished.
    assert_eq!(data["hasMore"], json!(true));

    let (_, body) = json_request(
        &server.router,
        "GET",
        "/api/history?limit=10",
        None,
        Some(&token),
    )
    .await;
    assert_eq!(body["data"]["files"].as_array().unwrap().len(), 3);
    assert_eq!(body["data"]["hasMore"], json!(false));
}

#[tokio::test]
async fn folders_can_be_created_and_recursively_deleted() {
    let server = TestServer::new().await;
    let token = server.login().await;

    let (status, body) = json_request(
        &server.router,
        "POST",
        "/api/folders",
        Some(json!({"path": "albums/summer"})),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["path"], json!("albums/summer/"));
    // The marker object keeps the empty folder listable.
    server.storage().get("albums/summer/.keep").await.unwrap();

    server
        .storage()
        .put(
            "albums/summer/a.png",
            Bytes::from_static(b"x"),
            &PutOptions::default(),
        )
        .await
        .unwrap();

    let (status, body) = json_request(
        &server.router,
        "DELETE",
        "/api/folders",
        Some(json!({"path": "albums/summer"})),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deleted"], json!(2));
    assert_eq!(body["data"]["path"], json!("albums/summer/"));
    assert!(server.storage().get("albums/summer/.keep").await.is_err());
}

#[tokio::test]
async fn folder_endpoints_validate_the_path() {
    let server = TestServer::new().await;
    let token = server.login().await;

    for method in ["POST", "DELETE"] {
        let (status, response) = json_request(
            &server.router,
            method,
            "/api/folders",
            Some(json!({"path": "../.."})),
            Some(&token),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{method} /api/folders");
        assert_eq!(response["error"], json!("path is required"));
    }
}
