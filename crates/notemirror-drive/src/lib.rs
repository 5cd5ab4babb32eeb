//! notemirror Drive - Google Drive v3 adapter
//!
//! Provides async adapters for:
//! - Service-account authorization (RS256 JWT bearer grant)
//! - Folder-scoped file operations via the Drive v3 REST API
//! - Secure storage of the service-account private key in the OS keyring
//!
//! ## Modules
//!
//! - [`auth`] - Assertion signing, token exchange and the [`auth::DriveAuthorizer`]
//! - [`client`] - Authenticated HTTP client and status classification
//! - [`files`] - Drive v3 list / find / create / update / delete calls
//! - [`keyring_store`] - Keyring-backed key storage and credential provider
//! - [`provider`] - [`provider::DriveRemoteStore`], the `IRemoteStore` implementation

pub mod auth;
pub mod client;
pub mod files;
pub mod keyring_store;
pub mod provider;

use thiserror::Error;

/// Errors that can occur when communicating with the Drive API
#[derive(Debug, Error)]
pub enum DriveError {
    /// The access token was rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Insufficient permissions for the requested operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded
    #[error("Too many requests: {0}")]
    TooManyRequests(String),

    /// A server-side error occurred (5xx)
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Any other non-success status
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },

    /// A network-level error occurred (including timeouts)
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The API response could not be parsed or was malformed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
