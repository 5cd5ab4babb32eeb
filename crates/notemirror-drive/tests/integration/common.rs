//! Shared test helpers for Drive API integration tests
//!
//! Each helper mounts the endpoints a test needs on a wiremock server and
//! returns adapters pointed at it.

use std::time::Duration;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use notemirror_core::domain::credentials::Credentials;
use notemirror_core::domain::newtypes::FolderId;
use notemirror_drive::auth::{DriveAuthorizer, ServiceAccountKey};
use notemirror_drive::client::DriveClient;
use notemirror_drive::provider::DriveRemoteStore;

pub const ACCESS_TOKEN: &str = "test-access-token";
pub const FOLDER: &str = "F1";

const KEY_JSON: &str = include_str!("../fixtures/service_account.json");

pub fn folder() -> FolderId {
    FolderId::new(FOLDER.to_string()).unwrap()
}

/// Starts a mock server and returns a store already holding a token
pub async fn setup_store() -> (MockServer, DriveRemoteStore) {
    let server = MockServer::start().await;
    let client =
        DriveClient::with_base_url(ACCESS_TOKEN, server.uri(), Duration::from_secs(5)).unwrap();
    (server, DriveRemoteStore::new(client))
}

/// Authorizer whose token endpoint and API both live on `server`
pub fn authorizer_for(server: &MockServer) -> DriveAuthorizer {
    DriveAuthorizer::with_endpoints(
        format!("{}/token", server.uri()),
        server.uri(),
        Duration::from_secs(5),
    )
    .unwrap()
}

/// Credentials built from the fixture key file
pub fn fixture_credentials() -> Credentials {
    let key = ServiceAccountKey::from_json(KEY_JSON).unwrap();
    Credentials::new(key.client_email, key.private_key, folder())
}

/// Mounts a token endpoint that grants `token` for `expires_in` seconds
/// and expects exactly `calls` exchanges
pub async fn mount_token(server: &MockServer, token: &str, expires_in: u64, calls: u64) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": token,
            "expires_in": expires_in,
            "token_type": "Bearer"
        })))
        .expect(calls)
        .mount(server)
        .await;
}

/// Mounts a single-page listing of `FOLDER`
pub async fn mount_list_single_page(server: &MockServer, files: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(query_param("q", "'F1' in parents and trashed = false"))
        .and(query_param("fields", "nextPageToken, files(id, name)"))
        .and(query_param("pageSize", "1000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "files": files
        })))
        .mount(server)
        .await;
}

/// Mounts a two-page listing of `FOLDER`
///
/// The request carrying `pageToken=page-2` gets page 2; any other listing
/// request gets page 1. Page 2 is mounted first so it wins when both match.
pub async fn mount_list_paginated(
    server: &MockServer,
    page1_files: serde_json::Value,
    page2_files: serde_json::Value,
) {
    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "files": page2_files
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(query_param("q", "'F1' in parents and trashed = false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "nextPageToken": "page-2",
            "files": page1_files
        })))
        .expect(1)
        .mount(server)
        .await;
}
