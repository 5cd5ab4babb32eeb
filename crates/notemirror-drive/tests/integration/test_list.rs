//! Integration tests for folder listing
//!
//! Verifies the folder-scoped query, pagination draining and the
//! termination guard.

use notemirror_core::domain::errors::StoreError;
use notemirror_core::domain::newtypes::RemoteId;
use notemirror_core::ports::remote_store::IRemoteStore;
use wiremock::{
    matchers::{method, path},
    Mock, ResponseTemplate,
};

use crate::common;

fn rid(s: &str) -> RemoteId {
    RemoteId::new(s.to_string()).unwrap()
}

#[tokio::test]
async fn test_list_single_page() {
    let (server, store) = common::setup_store().await;
    common::mount_list_single_page(
        &server,
        serde_json::json!([
            {"id": "id-a", "name": "a.md"},
            {"id": "id-b", "name": "b.md"}
        ]),
    )
    .await;

    let index = store.list(&common::folder()).await.expect("list failed");

    assert_eq!(index.len(), 2);
    assert_eq!(index.get("a.md"), Some(&rid("id-a")));
    assert_eq!(index.get("b.md"), Some(&rid("id-b")));
}

#[tokio::test]
async fn test_list_empty_folder() {
    let (server, store) = common::setup_store().await;
    common::mount_list_single_page(&server, serde_json::json!([])).await;

    let index = store.list(&common::folder()).await.unwrap();
    assert!(index.is_empty());
}

#[tokio::test]
async fn test_list_drains_all_pages() {
    let (server, store) = common::setup_store().await;
    common::mount_list_paginated(
        &server,
        serde_json::json!([
            {"id": "id-1", "name": "one.md"},
            {"id": "id-2", "name": "two.md"}
        ]),
        serde_json::json!([
            {"id": "id-3", "name": "three.md"}
        ]),
    )
    .await;

    let index = store.list(&common::folder()).await.expect("list failed");

    assert_eq!(index.len(), 3);
    assert!(index.contains("one.md"));
    assert!(index.contains("two.md"));
    assert_eq!(index.get("three.md"), Some(&rid("id-3")));
}

#[tokio::test]
async fn test_list_empty_token_ends_pagination() {
    let (server, store) = common::setup_store().await;
    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "nextPageToken": "",
            "files": [{"id": "id-1", "name": "one.md"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let index = store.list(&common::folder()).await.unwrap();
    assert_eq!(index.len(), 1);
}

#[tokio::test]
async fn test_list_repeated_token_fails() {
    let (server, store) = common::setup_store().await;
    // Every page points back at the same token
    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "nextPageToken": "loop",
            "files": [{"id": "id-1", "name": "one.md"}]
        })))
        .expect(2)
        .mount(&server)
        .await;

    let err = store.list(&common::folder()).await.unwrap_err();

    assert!(matches!(err, StoreError::RemoteListFailed { ref folder, .. } if folder == "F1"));
    assert!(err.to_string().contains("repeated"));
}

#[tokio::test]
async fn test_list_server_error_fails() {
    let (server, store) = common::setup_store().await;
    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "error": {"code": 500, "message": "Internal Error"}
        })))
        .mount(&server)
        .await;

    let err = store.list(&common::folder()).await.unwrap_err();

    assert!(matches!(err, StoreError::RemoteListFailed { .. }));
    assert!(err.to_string().contains("Internal Error"));
}

#[tokio::test]
async fn test_list_duplicate_names_keep_last() {
    let (server, store) = common::setup_store().await;
    common::mount_list_single_page(
        &server,
        serde_json::json!([
            {"id": "old-copy", "name": "dup.md"},
            {"id": "new-copy", "name": "dup.md"}
        ]),
    )
    .await;

    let index = store.list(&common::folder()).await.unwrap();

    assert_eq!(index.len(), 1);
    assert_eq!(index.get("dup.md"), Some(&rid("new-copy")));
}
