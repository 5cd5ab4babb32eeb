//! Local directory adapter (secondary/driven adapter)
//!
//! Implements [`ILocalEnumerator`] using `tokio::fs`. Enumeration is flat:
//! only regular files directly inside the directory are considered, and
//! symlinks are followed when deciding whether an entry is a regular file.

use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use notemirror_core::domain::errors::LocalError;
use notemirror_core::domain::newtypes::Extension;
use notemirror_core::domain::sync_plan::LocalFileSet;
use notemirror_core::ports::local_enumerator::ILocalEnumerator;

/// Adapter that bridges the [`ILocalEnumerator`] port to the real filesystem.
///
/// Zero-sized: the directory and extension arrive with every call.
#[derive(Debug, Clone, Default)]
pub struct LocalDirectoryAdapter;

impl LocalDirectoryAdapter {
    /// Create a new `LocalDirectoryAdapter`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ILocalEnumerator for LocalDirectoryAdapter {
    #[instrument(skip(self), fields(directory = %directory.display(), extension = %extension))]
    async fn list(
        &self,
        directory: &Path,
        extension: &Extension,
    ) -> Result<LocalFileSet, LocalError> {
        let unreadable = |source| LocalError::DirectoryUnreadable {
            path: directory.to_path_buf(),
            source,
        };

        let mut entries = tokio::fs::read_dir(directory).await.map_err(unreadable)?;
        let mut names = LocalFileSet::new();

        while let Some(entry) = entries.next_entry().await.map_err(unreadable)? {
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    warn!(name = ?raw, "Skipping entry with non-UTF-8 name");
                    continue;
                }
            };

            if !extension.matches(&name) {
                continue;
            }

            // metadata() follows symlinks
            match tokio::fs::metadata(entry.path()).await {
                Ok(meta) if meta.is_file() => {
                    names.insert(name);
                }
                Ok(_) => debug!(name = %name, "Skipping non-regular entry"),
                Err(e) => warn!(name = %name, error = %e, "Skipping unreadable entry"),
            }
        }

        debug!(count = names.len(), "Enumerated local files");
        Ok(names)
    }

    #[instrument(skip(self), fields(directory = %directory.display()))]
    async fn read_file(&self, directory: &Path, name: &str) -> Result<Vec<u8>, LocalError> {
        let path = directory.join(name);
        let data = tokio::fs::read(&path)
            .await
            .map_err(|source| LocalError::LocalReadFailed { path, source })?;
        debug!(bytes = data.len(), "Read local file");
        Ok(data)
    }
}
