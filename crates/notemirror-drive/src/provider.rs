//! DriveRemoteStore - IRemoteStore implementation for Google Drive
//!
//! Wraps an authorized [`DriveClient`] and delegates to the [`files`]
//! module, mapping transport failures onto the typed [`StoreError`]
//! variants of the port. A 401 from any call revokes the store's token
//! lease so the next authorization exchanges a fresh token.

use async_trait::async_trait;
use tracing::debug;

use notemirror_core::domain::errors::StoreError;
use notemirror_core::domain::newtypes::{FolderId, RemoteId};
use notemirror_core::domain::sync_plan::RemoteFileIndex;
use notemirror_core::ports::remote_store::IRemoteStore;

use crate::auth::TokenLease;
use crate::client::DriveClient;
use crate::{files, DriveError};

/// Remote store backed by the Drive v3 API
#[derive(Debug, Clone)]
pub struct DriveRemoteStore {
    client: DriveClient,
    lease: Option<TokenLease>,
}

impl DriveRemoteStore {
    /// Creates a store around an already authorized client
    pub fn new(client: DriveClient) -> Self {
        Self {
            client,
            lease: None,
        }
    }

    /// Creates a store whose token is evicted from the authorizer's cache
    /// when the API rejects it
    pub fn with_lease(client: DriveClient, lease: TokenLease) -> Self {
        Self {
            client,
            lease: Some(lease),
        }
    }

    async fn checked<T>(&self, result: anyhow::Result<T>) -> anyhow::Result<T> {
        let rejected = matches!(&result, Err(cause) if is_unauthorized(cause));
        if let (true, Some(lease)) = (rejected, &self.lease) {
            lease.revoke().await;
        }
        result
    }
}

fn is_unauthorized(cause: &anyhow::Error) -> bool {
    cause.chain().any(|e| {
        matches!(
            e.downcast_ref::<DriveError>(),
            Some(DriveError::Unauthorized(_))
        )
    })
}

#[async_trait]
impl IRemoteStore for DriveRemoteStore {
    async fn list(&self, folder: &FolderId) -> Result<RemoteFileIndex, StoreError> {
        let listed = self
            .checked(files::list_folder(&self.client, folder).await)
            .await
            .map_err(|cause| StoreError::RemoteListFailed {
                folder: folder.to_string(),
                cause,
            })?;

        let mut index = RemoteFileIndex::new();
        for file in listed {
            let id = RemoteId::new(file.id).map_err(|e| StoreError::RemoteListFailed {
                folder: folder.to_string(),
                cause: anyhow::Error::new(e).context("Drive returned a malformed file ID"),
            })?;
            index.insert(file.name, id);
        }

        debug!(folder = %folder, entries = index.len(), "Built remote index");
        Ok(index)
    }

    async fn find_by_name(
        &self,
        folder: &FolderId,
        name: &str,
    ) -> Result<Option<RemoteId>, StoreError> {
        self.checked(files::find_by_name(&self.client, folder, name).await)
            .await
            .map_err(|cause| StoreError::RemoteLookupFailed {
                name: name.to_string(),
                cause,
            })
    }

    async fn create(
        &self,
        folder: &FolderId,
        name: &str,
        data: &[u8],
    ) -> Result<RemoteId, StoreError> {
        self.checked(files::create_file(&self.client, folder, name, data).await)
            .await
            .map_err(|cause| StoreError::RemoteWriteFailed {
                name: name.to_string(),
                cause,
            })
    }

    async fn update(
        &self,
        id: &RemoteId,
        name: &str,
        data: &[u8],
        add_parent: Option<&FolderId>,
    ) -> Result<RemoteId, StoreError> {
        self.checked(files::update_file(&self.client, id, name, data, add_parent).await)
            .await
            .map_err(|cause| StoreError::RemoteWriteFailed {
                name: name.to_string(),
                cause,
            })
    }

    async fn delete(&self, id: &RemoteId) -> Result<(), StoreError> {
        self.checked(files::delete_file(&self.client, id).await)
            .await
            .map_err(|cause| StoreError::RemoteDeleteFailed {
                id: id.to_string(),
                cause,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_unauthorized_detected_through_context() {
        let err: anyhow::Result<()> = Err(DriveError::Unauthorized("expired".into()))
            .context("List page 1 request failed");
        assert!(is_unauthorized(&err.unwrap_err()));
    }

    #[test]
    fn test_other_statuses_are_not_unauthorized() {
        let err: anyhow::Result<()> =
            Err(DriveError::Forbidden("quota".into())).context("Create request failed");
        assert!(!is_unauthorized(&err.unwrap_err()));
        assert!(!is_unauthorized(&anyhow::anyhow!("Pagination token repeated")));
    }
}
