//! Domain types and business logic
//!
//! This module contains the core domain types for notemirror:
//! - Newtypes for validated identifiers (`RemoteId`, `FolderId`, `Extension`)
//! - Service credentials handed to the authorizer
//! - The local/remote snapshots and the `SyncPlan` computed from them
//! - The outcome of a sync pass and its failure taxonomy
//! - Domain-specific error types

pub mod credentials;
pub mod errors;
pub mod newtypes;
pub mod outcome;
pub mod sync_plan;

// Re-export commonly used types
pub use credentials::Credentials;
pub use errors::{
    AuthError, DomainError, EnumerationError, LocalError, StoreError, UpsertError,
};
pub use newtypes::*;
pub use outcome::{SyncFailure, SyncOutcome, SyncReport, SyncStage, SyncStatus};
pub use sync_plan::{LocalFileSet, RemoteFileIndex, SyncPlan};
