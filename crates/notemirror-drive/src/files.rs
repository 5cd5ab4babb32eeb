//! Drive v3 file operations
//!
//! Thin wrappers over the `files` resource, each scoped to a single parent
//! folder:
//!
//! - [`list_folder`] drains the paginated listing of a folder
//! - [`find_by_name`] looks up one object by exact name inside a folder
//! - [`create_file`] uploads a new object with a `multipart/related` body
//! - [`update_file`] replaces an object's content with a media upload
//! - [`delete_file`] removes an object outright
//!
//! Trashed objects are excluded from every query.

use std::collections::HashSet;

use anyhow::{bail, Context, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::Deserialize;
use tracing::debug;

use notemirror_core::domain::newtypes::{FolderId, RemoteId};

use crate::client::DriveClient;

/// Metadata endpoint for the files resource
const FILES_PATH: &str = "/drive/v3/files";

/// Upload endpoint for the files resource
const UPLOAD_PATH: &str = "/upload/drive/v3/files";

/// Objects requested per listing page
const LIST_PAGE_SIZE: &str = "1000";

/// Upper bound on listing pages before the listing is declared runaway
pub const MAX_LIST_PAGES: usize = 1000;

// ============================================================================
// Drive API response types
// ============================================================================

/// One page of `GET /drive/v3/files`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileListResponse {
    #[serde(default)]
    files: Vec<DriveFile>,
    next_page_token: Option<String>,
}

/// Minimal file resource (`fields=files(id, name)`)
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DriveFile {
    pub id: String,
    pub name: String,
}

/// Response of create/update with `fields=id`
#[derive(Debug, Deserialize)]
struct FileIdResponse {
    id: String,
}

// ============================================================================
// Helpers
// ============================================================================

/// Escapes a string for use inside a single-quoted Drive query literal
pub fn escape_query_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '\\' || c == '\'' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Query selecting the non-trashed children of `folder`
fn children_query(folder: &FolderId) -> String {
    format!(
        "'{}' in parents and trashed = false",
        escape_query_literal(folder.as_str())
    )
}

/// Content type for an object, derived from its extension
pub fn mime_for_name(name: &str) -> &'static str {
    match name.rsplit_once('.').map(|(_, ext)| ext) {
        Some("md") => "text/markdown",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

fn parse_remote_id(id: String) -> Result<RemoteId> {
    RemoteId::new(id).context("Drive returned a malformed file ID")
}

/// Builds a `multipart/related` body: JSON metadata part then media part
///
/// Returns the body and the boundary it uses.
fn multipart_related_body(
    metadata: &serde_json::Value,
    mime: &str,
    data: &[u8],
) -> (Vec<u8>, String) {
    let boundary = format!("notemirror-{}", uuid::Uuid::new_v4().simple());
    let mut body = Vec::with_capacity(data.len() + 512);

    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata.to_string().as_bytes());
    body.extend_from_slice(format!("\r\n--{boundary}\r\n").as_bytes());
    body.extend_from_slice(format!("Content-Type: {mime}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    (body, boundary)
}

// ============================================================================
// Operations
// ============================================================================

/// Lists every non-trashed object whose parent is `folder`
///
/// Follows `nextPageToken` until it is absent or empty. A token seen twice,
/// or more than [`MAX_LIST_PAGES`] pages, fails the listing.
pub async fn list_folder(client: &DriveClient, folder: &FolderId) -> Result<Vec<DriveFile>> {
    let query = children_query(folder);
    let mut files = Vec::new();
    let mut seen_tokens: HashSet<String> = HashSet::new();
    let mut page_token: Option<String> = None;
    let mut page_count: usize = 0;

    loop {
        if page_count >= MAX_LIST_PAGES {
            bail!("Listing exceeded {MAX_LIST_PAGES} pages");
        }
        page_count += 1;

        let mut request = client.request(Method::GET, FILES_PATH).query(&[
            ("q", query.as_str()),
            ("fields", "nextPageToken, files(id, name)"),
            ("pageSize", LIST_PAGE_SIZE),
        ]);
        if let Some(token) = &page_token {
            request = request.query(&[("pageToken", token.as_str())]);
        }

        let page: FileListResponse = client
            .send(request)
            .await
            .with_context(|| format!("List page {page_count} request failed"))?
            .json()
            .await
            .context("Failed to parse file list JSON")?;

        debug!(
            folder = %folder,
            page = page_count,
            items = page.files.len(),
            has_next = page.next_page_token.is_some(),
            "Received list page"
        );

        files.extend(page.files);

        match page.next_page_token {
            Some(token) if !token.is_empty() => {
                if !seen_tokens.insert(token.clone()) {
                    bail!("Pagination token repeated after page {page_count}");
                }
                page_token = Some(token);
            }
            _ => break,
        }
    }

    debug!(folder = %folder, pages = page_count, total = files.len(), "Listing complete");
    Ok(files)
}

/// Finds the first non-trashed object in `folder` named exactly `name`
pub async fn find_by_name(
    client: &DriveClient,
    folder: &FolderId,
    name: &str,
) -> Result<Option<RemoteId>> {
    let query = format!(
        "name = '{}' and {}",
        escape_query_literal(name),
        children_query(folder)
    );

    let request = client.request(Method::GET, FILES_PATH).query(&[
        ("q", query.as_str()),
        ("fields", "files(id, name)"),
        ("pageSize", "1"),
    ]);

    let page: FileListResponse = client
        .send(request)
        .await
        .context("Lookup request failed")?
        .json()
        .await
        .context("Failed to parse lookup JSON")?;

    let found = page.files.into_iter().next();
    debug!(name, found = found.is_some(), "Lookup by name");

    found.map(|f| parse_remote_id(f.id)).transpose()
}

/// Creates `name` in `folder` with the given content
pub async fn create_file(
    client: &DriveClient,
    folder: &FolderId,
    name: &str,
    data: &[u8],
) -> Result<RemoteId> {
    let metadata = serde_json::json!({
        "name": name,
        "parents": [folder.as_str()],
    });
    let (body, boundary) = multipart_related_body(&metadata, mime_for_name(name), data);

    let request = client
        .request(Method::POST, UPLOAD_PATH)
        .query(&[("uploadType", "multipart"), ("fields", "id")])
        .header(
            CONTENT_TYPE,
            format!("multipart/related; boundary={boundary}"),
        )
        .body(body);

    let created: FileIdResponse = client
        .send(request)
        .await
        .context("Create request failed")?
        .json()
        .await
        .context("Failed to parse create response JSON")?;

    debug!(name, id = %created.id, size = data.len(), "Created remote file");
    parse_remote_id(created.id)
}

/// Replaces the content of `id`, optionally adding `add_parent` to its parents
pub async fn update_file(
    client: &DriveClient,
    id: &RemoteId,
    name: &str,
    data: &[u8],
    add_parent: Option<&FolderId>,
) -> Result<RemoteId> {
    let path = format!("{UPLOAD_PATH}/{id}");
    let mut request = client
        .request(Method::PATCH, &path)
        .query(&[("uploadType", "media"), ("fields", "id")]);
    if let Some(folder) = add_parent {
        request = request.query(&[("addParents", folder.as_str())]);
    }
    let request = request
        .header(CONTENT_TYPE, mime_for_name(name))
        .body(data.to_vec());

    let updated: FileIdResponse = client
        .send(request)
        .await
        .context("Update request failed")?
        .json()
        .await
        .context("Failed to parse update response JSON")?;

    debug!(name, id = %updated.id, size = data.len(), "Updated remote file");
    parse_remote_id(updated.id)
}

/// Deletes `id` permanently (bypasses the trash)
pub async fn delete_file(client: &DriveClient, id: &RemoteId) -> Result<()> {
    let path = format!("{FILES_PATH}/{id}");
    client
        .send(client.request(Method::DELETE, &path))
        .await
        .context("Delete request failed")?;

    debug!(id = %id, "Deleted remote file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_query_literal() {
        assert_eq!(escape_query_literal("plain.md"), "plain.md");
        assert_eq!(escape_query_literal("it's.md"), "it\\'s.md");
        assert_eq!(escape_query_literal("a\\b.md"), "a\\\\b.md");
    }

    #[test]
    fn test_children_query() {
        let folder = FolderId::new("F1".to_string()).unwrap();
        assert_eq!(children_query(&folder), "'F1' in parents and trashed = false");
    }

    #[test]
    fn test_mime_for_name() {
        assert_eq!(mime_for_name("note.md"), "text/markdown");
        assert_eq!(mime_for_name("todo.txt"), "text/plain");
        assert_eq!(mime_for_name("photo.png"), "application/octet-stream");
        assert_eq!(mime_for_name("README"), "application/octet-stream");
    }

    #[test]
    fn test_multipart_related_body_layout() {
        let metadata = serde_json::json!({"name": "a.md", "parents": ["F1"]});
        let (body, boundary) = multipart_related_body(&metadata, "text/markdown", b"# Title");
        let text = String::from_utf8(body).unwrap();

        assert!(boundary.starts_with("notemirror-"));
        assert!(text.starts_with(&format!("--{boundary}\r\n")));
        assert!(text.contains("Content-Type: application/json; charset=UTF-8\r\n\r\n{"));
        assert!(text.contains("\"parents\":[\"F1\"]"));
        assert!(text.contains("Content-Type: text/markdown\r\n\r\n# Title\r\n"));
        assert!(text.ends_with(&format!("--{boundary}--\r\n")));
    }
}
