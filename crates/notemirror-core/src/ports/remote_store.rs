//! Remote store port (driven/secondary port)
//!
//! This module defines the interface for the remote object store that
//! mirrors the local directory. The shipped implementation targets the
//! Google Drive v3 API, but the trait only speaks in folder IDs, object
//! names and opaque object IDs.
//!
//! ## Design Notes
//!
//! - Every method returns a typed [`StoreError`]; adapters attach the
//!   transport cause as its source.
//! - Lookups are scoped to a folder. An object outside the target folder is
//!   never matched by name.
//! - Implementations must not retry internally; the reconciler decides what
//!   a failure means for the pass.

use crate::domain::errors::StoreError;
use crate::domain::newtypes::{FolderId, RemoteId};
use crate::domain::sync_plan::RemoteFileIndex;

/// Port trait for remote object store operations
#[async_trait::async_trait]
pub trait IRemoteStore: Send + Sync {
    /// Lists every non-trashed object whose parent is `folder`
    ///
    /// Drains all pages of the listing before returning.
    ///
    /// # Errors
    /// [`StoreError::RemoteListFailed`] if any page fails or pagination does
    /// not terminate.
    async fn list(&self, folder: &FolderId) -> Result<RemoteFileIndex, StoreError>;

    /// Finds an object in `folder` whose name equals `name` exactly
    ///
    /// # Returns
    /// The first match's ID, or `None` if there is no such object
    ///
    /// # Errors
    /// [`StoreError::RemoteLookupFailed`] if the query itself fails
    async fn find_by_name(
        &self,
        folder: &FolderId,
        name: &str,
    ) -> Result<Option<RemoteId>, StoreError>;

    /// Creates a new object named `name` in `folder`
    ///
    /// # Returns
    /// The ID assigned by the store
    ///
    /// # Errors
    /// [`StoreError::RemoteWriteFailed`]
    async fn create(
        &self,
        folder: &FolderId,
        name: &str,
        data: &[u8],
    ) -> Result<RemoteId, StoreError>;

    /// Replaces the content of an existing object
    ///
    /// When `add_parent` is set the object is additionally placed in that
    /// folder (additive; existing parents are kept).
    ///
    /// # Errors
    /// [`StoreError::RemoteWriteFailed`]
    async fn update(
        &self,
        id: &RemoteId,
        name: &str,
        data: &[u8],
        add_parent: Option<&FolderId>,
    ) -> Result<RemoteId, StoreError>;

    /// Removes an object outright
    ///
    /// # Errors
    /// [`StoreError::RemoteDeleteFailed`]
    async fn delete(&self, id: &RemoteId) -> Result<(), StoreError>;
}
