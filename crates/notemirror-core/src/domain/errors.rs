//! Domain error types
//!
//! This module defines the validation errors raised by domain newtypes and
//! the typed failure modes of every port. Adapters attach the underlying
//! cause as an [`anyhow::Error`] so the full chain reaches the log.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid remote object ID format
    #[error("Invalid remote ID: {0}")]
    InvalidRemoteId(String),

    /// Invalid remote folder ID format
    #[error("Invalid folder ID: {0}")]
    InvalidFolderId(String),

    /// Invalid file extension filter
    #[error("Invalid extension: {0}")]
    InvalidExtension(String),

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

/// Failures of the credential provider or the authorizer
#[derive(Debug, Error)]
pub enum AuthError {
    /// The credential provider could not produce credentials
    #[error("Credentials unavailable: {0:#}")]
    CredentialsUnavailable(#[source] anyhow::Error),

    /// The credentials are syntactically unusable (empty identity, bad key)
    #[error("Malformed credentials: {0}")]
    MalformedCredentials(String),

    /// The token endpoint refused the exchange or could not be reached
    #[error("Token exchange rejected: {0:#}")]
    ExchangeRejected(#[source] anyhow::Error),
}

/// Failures of the local enumerator
#[derive(Debug, Error)]
pub enum LocalError {
    /// The directory does not exist or cannot be listed
    #[error("Directory unreadable: {}: {source}", path.display())]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file selected for upload could not be read
    #[error("Failed to read local file: {}: {source}", path.display())]
    LocalReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures of the remote store client
#[derive(Debug, Error)]
pub enum StoreError {
    /// Paginated listing of a folder failed
    #[error("Failed to list remote folder {folder}: {cause:#}")]
    RemoteListFailed {
        folder: String,
        #[source]
        cause: anyhow::Error,
    },

    /// Looking up an object by name failed
    #[error("Failed to look up remote object {name}: {cause:#}")]
    RemoteLookupFailed {
        name: String,
        #[source]
        cause: anyhow::Error,
    },

    /// Creating or updating an object failed
    #[error("Failed to write remote object {name}: {cause:#}")]
    RemoteWriteFailed {
        name: String,
        #[source]
        cause: anyhow::Error,
    },

    /// Deleting an object failed
    #[error("Failed to delete remote object {id}: {cause:#}")]
    RemoteDeleteFailed {
        id: String,
        #[source]
        cause: anyhow::Error,
    },
}

/// Failure of the concurrent enumeration stage
#[derive(Debug, Error)]
pub enum EnumerationError {
    #[error(transparent)]
    Local(#[from] LocalError),

    #[error(transparent)]
    Remote(#[from] StoreError),
}

/// Failure of a single file's upsert
#[derive(Debug, Error)]
pub enum UpsertError {
    #[error("lookup failed: {0}")]
    Lookup(#[source] StoreError),

    #[error("read failed: {0}")]
    Read(#[source] LocalError),

    #[error("write failed: {0}")]
    Write(#[source] StoreError),
}
