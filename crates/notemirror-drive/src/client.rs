//! Google Drive API client
//!
//! Provides a typed HTTP client for the Drive v3 REST API. Handles the
//! bearer header, base URL construction, the per-request timeout and the
//! classification of error statuses into [`DriveError`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use notemirror_drive::client::DriveClient;
//!
//! # fn example() -> anyhow::Result<()> {
//! let client = DriveClient::new("access-token-here", Duration::from_secs(30))?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::DriveError;

/// Base URL for the Google APIs host
pub const DRIVE_BASE_URL: &str = "https://www.googleapis.com";

// ============================================================================
// Error body
// ============================================================================

/// Error envelope returned by Google APIs
///
/// `{"error": {"code": 404, "message": "File not found: abc."}}`
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Extract a readable message from an error response body
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.error.message)
        .unwrap_or_else(|| body.trim().to_string())
}

/// Converts a non-success response into a [`DriveError`]
///
/// Success responses are passed through untouched.
pub async fn check_status(response: Response) -> Result<Response, DriveError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body);

    Err(match status {
        StatusCode::UNAUTHORIZED => DriveError::Unauthorized(message),
        StatusCode::FORBIDDEN => DriveError::Forbidden(message),
        StatusCode::NOT_FOUND => DriveError::NotFound(message),
        StatusCode::TOO_MANY_REQUESTS => DriveError::TooManyRequests(message),
        s if s.is_server_error() => DriveError::ServerError {
            status: s.as_u16(),
            message,
        },
        s => DriveError::UnexpectedStatus {
            status: s.as_u16(),
            message,
        },
    })
}

// ============================================================================
// DriveClient
// ============================================================================

/// HTTP client for Drive API calls
///
/// Wraps `reqwest::Client` with the bearer token and base URL. Every request
/// inherits the timeout given at construction.
#[derive(Debug, Clone)]
pub struct DriveClient {
    /// The underlying HTTP client
    client: Client,
    /// Base URL for API requests
    base_url: String,
    /// OAuth2 access token
    access_token: String,
}

impl DriveClient {
    /// Creates a new DriveClient against the public Google APIs host
    ///
    /// # Arguments
    /// * `access_token` - A valid OAuth2 access token with the drive scope
    /// * `timeout` - Per-request timeout
    pub fn new(access_token: impl Into<String>, timeout: Duration) -> Result<Self> {
        Self::with_base_url(access_token, DRIVE_BASE_URL, timeout)
    }

    /// Creates a new DriveClient with a custom base URL (useful for testing)
    pub fn with_base_url(
        access_token: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::from_parts(client, base_url, access_token))
    }

    /// Creates a DriveClient that shares an existing `reqwest::Client`
    pub fn from_parts(
        client: Client,
        base_url: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        }
    }

    /// Returns the base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns a reference to the current access token
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Creates an authenticated request builder for the given method and path
    ///
    /// # Arguments
    /// * `method` - HTTP method
    /// * `path` - API path relative to the base URL (e.g. "/drive/v3/files")
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(method = method.as_str(), url = %url, "Drive request");
        self.client
            .request(method, &url)
            .bearer_auth(&self.access_token)
    }

    /// Sends a request and classifies the response status
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, DriveError> {
        let response = request.send().await?;
        check_status(response).await
    }
}
