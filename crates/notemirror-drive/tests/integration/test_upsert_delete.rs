//! Integration tests for lookup, create, update and delete
//!
//! Verifies the exact requests the store issues for each write path
//! against a wiremock-based Drive API mock server.

use notemirror_core::domain::errors::StoreError;
use notemirror_core::domain::newtypes::RemoteId;
use notemirror_core::ports::remote_store::IRemoteStore;
use wiremock::{
    matchers::{body_bytes, body_string_contains, header, method, path, query_param},
    Mock, ResponseTemplate,
};

use crate::common;

fn rid(s: &str) -> RemoteId {
    RemoteId::new(s.to_string()).unwrap()
}

// ============================================================================
// Lookup
// ============================================================================

#[tokio::test]
async fn test_find_by_name_is_folder_scoped_and_escaped() {
    let (server, store) = common::setup_store().await;
    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(query_param(
            "q",
            "name = 'it\\'s.md' and 'F1' in parents and trashed = false",
        ))
        .and(query_param("pageSize", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "files": [{"id": "found-1", "name": "it's.md"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let found = store
        .find_by_name(&common::folder(), "it's.md")
        .await
        .unwrap();
    assert_eq!(found, Some(rid("found-1")));
}

#[tokio::test]
async fn test_find_by_name_absent() {
    let (server, store) = common::setup_store().await;
    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "files": []
        })))
        .mount(&server)
        .await;

    let found = store.find_by_name(&common::folder(), "new.md").await.unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn test_find_by_name_failure_is_lookup_error() {
    let (server, store) = common::setup_store().await;
    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = store
        .find_by_name(&common::folder(), "a.md")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::RemoteLookupFailed { ref name, .. } if name == "a.md"));
}

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn test_create_sends_multipart_related() {
    let (server, store) = common::setup_store().await;
    Mock::given(method("POST"))
        .and(path("/upload/drive/v3/files"))
        .and(query_param("uploadType", "multipart"))
        .and(query_param("fields", "id"))
        .and(header("Authorization", "Bearer test-access-token"))
        .and(body_string_contains(r#"{"name":"hello.md","parents":["F1"]}"#))
        .and(body_string_contains("Content-Type: text/markdown"))
        .and(body_string_contains("# Hello"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "new-1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let id = store
        .create(&common::folder(), "hello.md", b"# Hello")
        .await
        .expect("create failed");
    assert_eq!(id, rid("new-1"));

    let requests = server.received_requests().await.unwrap();
    let content_type = requests[0]
        .headers
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.starts_with("multipart/related; boundary=notemirror-"));
}

#[tokio::test]
async fn test_create_failure_is_write_error() {
    let (server, store) = common::setup_store().await;
    Mock::given(method("POST"))
        .and(path("/upload/drive/v3/files"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "error": {"code": 403, "message": "The user's Drive storage quota has been exceeded."}
        })))
        .mount(&server)
        .await;

    let err = store
        .create(&common::folder(), "big.md", b"data")
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::RemoteWriteFailed { ref name, .. } if name == "big.md"));
    assert!(err.to_string().contains("quota"));
}

// ============================================================================
// Update
// ============================================================================

#[tokio::test]
async fn test_update_sends_media_with_add_parents() {
    let (server, store) = common::setup_store().await;
    Mock::given(method("PATCH"))
        .and(path("/upload/drive/v3/files/id-1"))
        .and(query_param("uploadType", "media"))
        .and(query_param("addParents", "F1"))
        .and(query_param("fields", "id"))
        .and(header("Content-Type", "text/plain"))
        .and(body_bytes(b"new content".to_vec()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "id-1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let folder = common::folder();
    let id = store
        .update(&rid("id-1"), "todo.txt", b"new content", Some(&folder))
        .await
        .expect("update failed");
    assert_eq!(id, rid("id-1"));
}

#[tokio::test]
async fn test_update_without_parent_omits_add_parents() {
    let (server, store) = common::setup_store().await;
    Mock::given(method("PATCH"))
        .and(path("/upload/drive/v3/files/id-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "id-2"
        })))
        .mount(&server)
        .await;

    store
        .update(&rid("id-2"), "blob.bin", b"\x00\x01", None)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(!requests[0].url.query().unwrap_or("").contains("addParents"));
}

#[tokio::test]
async fn test_update_not_found_is_write_error() {
    let (server, store) = common::setup_store().await;
    Mock::given(method("PATCH"))
        .and(path("/upload/drive/v3/files/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = store
        .update(&rid("gone"), "a.md", b"x", None)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::RemoteWriteFailed { .. }));
}

// ============================================================================
// Delete
// ============================================================================

#[tokio::test]
async fn test_delete_removes_object() {
    let (server, store) = common::setup_store().await;
    Mock::given(method("DELETE"))
        .and(path("/drive/v3/files/id-9"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    store.delete(&rid("id-9")).await.expect("delete failed");
}

#[tokio::test]
async fn test_delete_failure_names_id() {
    let (server, store) = common::setup_store().await;
    Mock::given(method("DELETE"))
        .and(path("/drive/v3/files/id-9"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = store.delete(&rid("id-9")).await.unwrap_err();
    assert!(matches!(err, StoreError::RemoteDeleteFailed { ref id, .. } if id == "id-9"));
}
