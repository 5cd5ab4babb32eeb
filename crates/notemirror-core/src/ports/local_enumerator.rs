//! Local enumerator port (driven/secondary port)
//!
//! Lists the synchronizable files of a single local directory and reads
//! their contents. Enumeration is flat: subdirectories are never entered.

use std::path::Path;

use crate::domain::errors::LocalError;
use crate::domain::newtypes::Extension;
use crate::domain::sync_plan::LocalFileSet;

/// Port trait for local directory access
#[async_trait::async_trait]
pub trait ILocalEnumerator: Send + Sync {
    /// Lists the names of regular files in `directory` that match `extension`
    ///
    /// # Errors
    /// [`LocalError::DirectoryUnreadable`] if the directory is missing or
    /// cannot be listed
    async fn list(&self, directory: &Path, extension: &Extension)
        -> Result<LocalFileSet, LocalError>;

    /// Reads the bytes of `name` inside `directory`
    ///
    /// # Errors
    /// [`LocalError::LocalReadFailed`]
    async fn read_file(&self, directory: &Path, name: &str) -> Result<Vec<u8>, LocalError>;
}
