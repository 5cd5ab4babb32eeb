//! Result of a reconciliation pass
//!
//! Every call to the reconciler yields exactly one [`SyncOutcome`], which in
//! turn renders exactly one user-facing notice.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use super::errors::{AuthError, EnumerationError, StoreError, UpsertError};

/// Whether a reconciliation is currently running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    #[default]
    Idle,
    Busy,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Busy => write!(f, "busy"),
        }
    }
}

/// Counts for a completed pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub created: u32,
    pub updated: u32,
    pub deleted: u32,
    pub duration_ms: u64,
}

/// Stage at which a pass stopped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", content = "name", rename_all = "lowercase")]
pub enum SyncStage {
    Auth,
    Enumeration,
    Upsert(String),
    Delete(String),
}

impl fmt::Display for SyncStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auth => write!(f, "auth"),
            Self::Enumeration => write!(f, "enumeration"),
            Self::Upsert(name) => write!(f, "upsert {name}"),
            Self::Delete(name) => write!(f, "delete {name}"),
        }
    }
}

/// Why a pass stopped
#[derive(Debug, Error)]
pub enum SyncFailure {
    #[error("authorization failed: {0}")]
    Auth(#[source] AuthError),

    #[error("enumeration failed: {0}")]
    Enumeration(#[source] EnumerationError),

    #[error("upsert of {name} failed: {source}")]
    Upsert {
        name: String,
        #[source]
        source: UpsertError,
    },

    #[error("delete of {name} failed: {source}")]
    Delete {
        name: String,
        #[source]
        source: StoreError,
    },
}

impl SyncFailure {
    #[must_use]
    pub fn stage(&self) -> SyncStage {
        match self {
            Self::Auth(_) => SyncStage::Auth,
            Self::Enumeration(_) => SyncStage::Enumeration,
            Self::Upsert { name, .. } => SyncStage::Upsert(name.clone()),
            Self::Delete { name, .. } => SyncStage::Delete(name.clone()),
        }
    }
}

/// Single terminal result of `sync()`
#[derive(Debug)]
pub enum SyncOutcome {
    Success(SyncReport),
    Busy,
    Failed(SyncFailure),
}

impl SyncOutcome {
    /// The one human-readable notice for this outcome
    #[must_use]
    pub fn notice(&self) -> String {
        match self {
            Self::Success(_) => "Sync completed successfully!".to_string(),
            Self::Busy => {
                "A sync is already in progress. Please wait for it to complete.".to_string()
            }
            Self::Failed(failure) => format!(
                "Error syncing files ({}), check the log for details.",
                failure.stage()
            ),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}
