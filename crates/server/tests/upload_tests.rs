//! Integration tests for package upload and download.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::fixtures::{apk_bytes, index_text, multipart_package};
use common::TestServer;
use serde_json::Value;
use std::time::Duration;
use tower::ServiceExt;

const PACKAGES_URI: &str =
    "/v1/orgs/acme/distros/alpine/versions/3.18/repos/main/arches/x86_64/packages";
const ARTIFACT_KEY: &str = "static/acme/alpine/3.18/main/x86_64/hello-2.12-r1.apk";
const INDEX_KEY: &str = "static/acme/alpine/3.18/main/x86_64/APKINDEX.tar.gz";

async fn upload(
    server: &TestServer,
    uri: &str,
    file_name: &str,
    data: &[u8],
    token: &str,
) -> (StatusCode, Value) {
    let (content_type, body) = multipart_package(file_name, data);
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .header("Content-Type", content_type)
        .body(Body::from(body))
        .unwrap();

    let response = server.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn upload_server() -> TestServer {
    let server = TestServer::new().await;
    server.add_token("acme", "ci", "t1").await;
    server.add_signing_key("acme", "alpine", "alpine-1").await;
    server
}

async fn wait_for_index(server: &TestServer, key: &str) -> bytes::Bytes {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        if let Ok(data) = server.store().get(key).await {
            return data;
        }
        if tokio::time::Instant::now() > deadline {
            panic!("index was not published in time");
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

#[tokio::test]
async fn upload_publishes_artifact_and_schedules_rebuild() {
    let server = upload_server().await;

    let (status, body) = upload(
        &server,
        PACKAGES_URI,
        "hello-2.12-r1.apk",
        &apk_bytes("hello", "2.12-r1"),
        "t1",
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body.get("name").and_then(Value::as_str), Some("hello"));
    assert_eq!(
        body.get("version").and_then(Value::as_str),
        Some("2.12-r1")
    );

    assert!(server.store().exists(ARTIFACT_KEY).await.unwrap());

    let signed = wait_for_index(&server, INDEX_KEY).await;
    let text = index_text(&signed);
    assert!(text.contains("P:hello\n"));
}

#[tokio::test]
async fn upload_larger_than_stock_body_cap_succeeds() {
    let server = upload_server().await;

    // 4 MiB of incompressible payload, well past the multipart extractor's
    // stock 2 MiB cap. Must be accepted and stored intact.
    let data = common::fixtures::apk_bytes_with_payload("bigpkg", "1.0-r0", 4 * 1024 * 1024);
    assert!(data.len() > 2 * 1024 * 1024);

    let (status, body) = upload(&server, PACKAGES_URI, "bigpkg-1.0-r0.apk", &data, "t1").await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body.get("name").and_then(Value::as_str), Some("bigpkg"));

    let key = "static/acme/alpine/3.18/main/x86_64/bigpkg-1.0-r0.apk";
    assert_eq!(server.store().get(key).await.unwrap(), data);
}

#[tokio::test]
async fn upload_over_configured_limit_is_rejected() {
    let server = TestServer::with_config(|config| {
        config.server.max_upload_bytes = 64 * 1024;
    })
    .await;
    server.add_token("acme", "ci", "t1").await;
    server.add_signing_key("acme", "alpine", "alpine-1").await;

    let data = common::fixtures::apk_bytes_with_payload("bigpkg", "1.0-r0", 256 * 1024);
    let (status, _) = upload(&server, PACKAGES_URI, "bigpkg-1.0-r0.apk", &data, "t1").await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

    let key = "static/acme/alpine/3.18/main/x86_64/bigpkg-1.0-r0.apk";
    assert!(!server.store().exists(key).await.unwrap());
}

#[tokio::test]
async fn upload_requires_auth() {
    let server = upload_server().await;

    let (content_type, body) =
        multipart_package("hello-2.12-r1.apk", &apk_bytes("hello", "2.12-r1"));
    let request = Request::builder()
        .method("POST")
        .uri(PACKAGES_URI)
        .header("Content-Type", content_type)
        .body(Body::from(body))
        .unwrap();
    let response = server.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_upload_writes_nothing() {
    let server = upload_server().await;

    let (status, body) = upload(
        &server,
        PACKAGES_URI,
        "bad-1.0-r0.apk",
        b"this is not a package",
        "t1",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body.get("code").and_then(Value::as_str),
        Some("malformed_package")
    );

    let key = "static/acme/alpine/3.18/main/x86_64/bad-1.0-r0.apk";
    assert!(!server.store().exists(key).await.unwrap());
}

#[tokio::test]
async fn traversal_filename_is_rejected() {
    let server = upload_server().await;

    let (status, body) = upload(
        &server,
        PACKAGES_URI,
        "../../escape.apk",
        &apk_bytes("escape", "1.0-r0"),
        "t1",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body.get("code").and_then(Value::as_str),
        Some("invalid_path")
    );
}

#[tokio::test]
async fn missing_package_field_is_bad_request() {
    let server = upload_server().await;

    let (content_type, body) = multipart_package("x.apk", b"data");
    let body = String::from_utf8(body)
        .unwrap()
        .replace("name=\"package\"", "name=\"file\"");
    let request = Request::builder()
        .method("POST")
        .uri(PACKAGES_URI)
        .header("Authorization", "Bearer t1")
        .header("Content-Type", content_type)
        .body(Body::from(body))
        .unwrap();
    let response = server.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reupload_replaces_artifact() {
    let server = upload_server().await;

    let first = apk_bytes("hello", "2.12-r1");
    upload(&server, PACKAGES_URI, "hello-2.12-r1.apk", &first, "t1").await;

    let second = common::fixtures::apk_bytes_with_fields(
        "hello",
        "2.12-r1",
        &[("pkgdesc", "second upload")],
    );
    let (status, _) = upload(&server, PACKAGES_URI, "hello-2.12-r1.apk", &second, "t1").await;
    assert_eq!(status, StatusCode::CREATED);

    let stored = server.store().get(ARTIFACT_KEY).await.unwrap();
    assert_eq!(stored, second);
}

#[tokio::test]
async fn published_files_are_downloadable() {
    let server = upload_server().await;
    upload(
        &server,
        PACKAGES_URI,
        "hello-2.12-r1.apk",
        &apk_bytes("hello", "2.12-r1"),
        "t1",
    )
    .await;
    wait_for_index(&server, INDEX_KEY).await;

    for file in ["hello-2.12-r1.apk", "APKINDEX.tar.gz"] {
        let request = Request::builder()
            .method("GET")
            .uri(format!("/static/acme/alpine/3.18/main/x86_64/{file}"))
            .body(Body::empty())
            .unwrap();
        let response = server.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "download {file}");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(!body.is_empty());
    }

    let request = Request::builder()
        .method("GET")
        .uri("/static/acme/alpine/3.18/main/x86_64/nope.apk")
        .body(Body::empty())
        .unwrap();
    let response = server.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
