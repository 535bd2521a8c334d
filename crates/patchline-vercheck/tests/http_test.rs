//! Integration tests for the HTTP version-check endpoint.
//!
//! These tests start a real HTTP server and make actual requests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use axum::http::StatusCode;
use patchline_vercheck::{AppState, Family, FsArtifactStore, ServerConfig, Version};
use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;
use tempfile::{NamedTempFile, TempDir};

const GAME_BASE: &str = "2010.07.10.0000";
const GAME_MID: &str = "2010.09.19.0000";
const GAME_LATEST: &str = "2010.09.23.0000";

/// Create test catalog file.
fn create_test_catalog() -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temporary catalog file");
    let json = r#"[
        {"family":"boot","version":"2010.07.10.0000","build_time":"2010-07-10T00:00:00+00:00","payload_length":0},
        {"family":"game","version":"2010.07.10.0000","build_time":"2010-07-10T00:00:00+00:00","payload_length":0},
        {"family":"game","version":"2010.09.19.0000","build_time":"2010-09-19T00:00:00+00:00","payload_length":444398866},
        {"family":"game","version":"2010.09.23.0000","build_time":"2010-09-23T00:00:00+00:00","payload_length":6907277}
    ]"#;
    file.write_all(json.as_bytes())
        .expect("Failed to write test catalog");
    file
}

/// Write an artifact file for a release under the store root.
fn write_artifact(root: &std::path::Path, family: Family, version: &str, payload: &[u8]) {
    let store = FsArtifactStore::new(root, "torrent");
    let version: Version = version.parse().expect("Invalid test version");
    let path = store.artifact_path(family, &version);
    std::fs::create_dir_all(path.parent().expect("Artifact path should have a parent"))
        .expect("Failed to create artifact directories");
    std::fs::write(path, payload).expect("Failed to write artifact");
}

/// Start test HTTP server on a random port.
///
/// When `complete` is false, the artifact for the latest game release is
/// left missing to exercise the fail-fast path.
async fn start_test_server(complete: bool) -> (SocketAddr, TempDir) {
    // Install ring crypto provider for reqwest (idempotent)
    let _ = rustls::crypto::ring::default_provider().install_default();

    let catalog_file = create_test_catalog();
    let artifact_root = TempDir::new().expect("Failed to create artifact root");

    write_artifact(artifact_root.path(), Family::Game, GAME_MID, b"mid-metainfo");
    if complete {
        write_artifact(
            artifact_root.path(),
            Family::Game,
            GAME_LATEST,
            b"latest-metainfo",
        );
    }

    let config = ServerConfig {
        http_bind: "127.0.0.1:0".parse().expect("Failed to parse bind address"),
        releases: catalog_file.path().to_path_buf(),
        artifacts: artifact_root.path().to_path_buf(),
        artifact_extension: "torrent".to_string(),
        repository: "client/win32/release".to_string(),
        patch_module: "ZiPatch".to_string(),
        protocol: "torrent".to_string(),
        info_url: "http://example.com".to_string(),
        signature: "test-signature".to_string(),
    };

    let state = Arc::new(AppState::new(&config).expect("Failed to initialize AppState"));
    let app = patchline_vercheck::http::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind HTTP listener");
    let addr = listener
        .local_addr()
        .expect("Failed to get listener address");

    tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("HTTP server failed to run");
    });

    // Give server time to start
    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

    (addr, artifact_root)
}

#[tokio::test]
async fn test_vercheck_up_to_date() {
    let (addr, _artifacts) = start_test_server(true).await;

    let client = reqwest::Client::new();
    let response = client
        .get(format!("http://{addr}/patch/vercheck/game/{GAME_LATEST}"))
        .send()
        .await
        .expect("Failed to send GET request");

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        response
            .headers()
            .get("x-latest-version")
            .expect("Response should carry X-Latest-Version")
            .to_str()
            .expect("Header should be valid UTF-8"),
        GAME_LATEST
    );

    let body = response.bytes().await.expect("Failed to read body");
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_vercheck_not_found() {
    let (addr, _artifacts) = start_test_server(true).await;

    let client = reqwest::Client::new();
    let response = client
        .get(format!("http://{addr}/patch/vercheck/game/9999.01.01.0000"))
        .send()
        .await
        .expect("Failed to send GET request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response.bytes().await.expect("Failed to read body");
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_vercheck_unknown_family_not_found() {
    let (addr, _artifacts) = start_test_server(true).await;

    let client = reqwest::Client::new();
    let response = client
        .get(format!("http://{addr}/patch/vercheck/retail/{GAME_LATEST}"))
        .send()
        .await
        .expect("Failed to send GET request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_vercheck_needs_update_streams_manifest() {
    let (addr, _artifacts) = start_test_server(true).await;

    let client = reqwest::Client::new();
    let response = client
        .get(format!("http://{addr}/patch/vercheck/game/{GAME_BASE}"))
        .send()
        .await
        .expect("Failed to send GET request");

    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers().clone();
    let get = |name: &str| {
        headers
            .get(name)
            .unwrap_or_else(|| panic!("Response should carry {name}"))
            .to_str()
            .expect("Header should be valid UTF-8")
            .to_string()
    };

    assert!(get("content-type").starts_with("multipart/mixed; boundary="));
    let game_hash = Family::Game.repository_hash();
    assert_eq!(get("content-location"), format!("{game_hash}/vercheck.dat"));
    assert_eq!(get("x-repository"), "client/win32/release/game");
    assert_eq!(get("x-patch-module"), "ZiPatch");
    assert_eq!(get("x-protocol"), "torrent");
    assert_eq!(get("x-info-url"), "http://example.com");
    assert_eq!(get("x-latest-version"), GAME_LATEST);

    let body = response.text().await.expect("Failed to read body");

    // Two segments in chain order, then the terminator
    let boundary = "477D80B1_38BC_41d4_8B48_5273ADB89CAC";
    let expected = format!(
        "--{boundary}\r\n\
         Content-Type: application/octet-stream\r\n\
         Content-Location: {game_hash}/metainfo/D{GAME_MID}.torrent\r\n\
         X-Patch-Length: 444398866\r\n\
         X-Signature: test-signature\r\n\
         \r\n\
         mid-metainfo\
         --{boundary}\r\n\
         Content-Type: application/octet-stream\r\n\
         Content-Location: {game_hash}/metainfo/D{GAME_LATEST}.torrent\r\n\
         X-Patch-Length: 6907277\r\n\
         X-Signature: test-signature\r\n\
         \r\n\
         latest-metainfo\
         --{boundary}--\r\n\r\n"
    );
    assert_eq!(body, expected);
}

#[tokio::test]
async fn test_vercheck_missing_artifact_emits_nothing() {
    let (addr, _artifacts) = start_test_server(false).await;

    let client = reqwest::Client::new();
    let response = client
        .get(format!("http://{addr}/patch/vercheck/game/{GAME_BASE}"))
        .send()
        .await
        .expect("Failed to send GET request");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    // Fail-fast rule: zero manifest bytes written
    let body = response.bytes().await.expect("Failed to read body");
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_vercheck_boot_family_independent() {
    let (addr, _artifacts) = start_test_server(true).await;

    // Boot's only release is its latest even though Game has newer builds
    let client = reqwest::Client::new();
    let response = client
        .get(format!("http://{addr}/patch/vercheck/boot/{GAME_BASE}"))
        .send()
        .await
        .expect("Failed to send GET request");

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        response
            .headers()
            .get("x-latest-version")
            .expect("Response should carry X-Latest-Version")
            .to_str()
            .expect("Header should be valid UTF-8"),
        GAME_BASE
    );
}
