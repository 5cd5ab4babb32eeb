//! Reconciliation engine
//!
//! The [`Reconciler`] converges a remote folder onto the synchronizable files
//! of a local directory.
//!
//! ## Sync Flow
//!
//! 1. **Lock**: acquire the [`SyncLock`]; a held lock yields `Busy` at once
//! 2. **Authorize**: credentials from the provider, then an authorized store
//! 3. **Enumerate**: local listing and remote listing, concurrently
//! 4. **Plan**: [`SyncPlan::compute`]
//! 5. **Upsert**: every local file, with bounded concurrency
//! 6. **Delete**: remote objects with no local counterpart, sequentially
//!
//! Any stage failure ends the pass with a [`SyncFailure`] naming the stage.
//! Work already applied is kept; the next pass re-attempts the rest.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use futures_util::stream::{self, StreamExt};
use tokio::sync::watch;
use tracing::{debug, error, info, info_span, instrument, Instrument};

use notemirror_core::domain::errors::{EnumerationError, UpsertError};
use notemirror_core::domain::newtypes::{Extension, FolderId, RemoteId, SyncRunId};
use notemirror_core::domain::outcome::{SyncFailure, SyncOutcome, SyncReport, SyncStatus};
use notemirror_core::domain::sync_plan::SyncPlan;
use notemirror_core::ports::authorizer::IAuthorizer;
use notemirror_core::ports::credential_provider::ICredentialProvider;
use notemirror_core::ports::local_enumerator::ILocalEnumerator;
use notemirror_core::ports::remote_store::IRemoteStore;

/// Default number of upserts in flight
pub const DEFAULT_UPSERT_CONCURRENCY: usize = 4;

// ============================================================================
// SyncLock
// ============================================================================

/// Mutual-exclusion flag for sync passes
///
/// Acquisition never waits. The returned [`SyncGuard`] releases the flag on
/// drop, so every exit path of a pass (including panics) frees it. The lock
/// also publishes [`SyncStatus`] on a watch channel.
#[derive(Debug)]
pub struct SyncLock {
    held: AtomicBool,
    status: watch::Sender<SyncStatus>,
}

impl SyncLock {
    pub fn new() -> Self {
        let (status, _) = watch::channel(SyncStatus::Idle);
        Self {
            held: AtomicBool::new(false),
            status,
        }
    }

    /// Takes the lock, or returns `None` if a pass already holds it
    pub fn try_acquire(&self) -> Option<SyncGuard<'_>> {
        self.held
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        self.status.send_replace(SyncStatus::Busy);
        Some(SyncGuard { lock: self })
    }

    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }

    pub fn status(&self) -> SyncStatus {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.status.subscribe()
    }
}

impl Default for SyncLock {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard for a held [`SyncLock`]
#[derive(Debug)]
pub struct SyncGuard<'a> {
    lock: &'a SyncLock,
}

impl Drop for SyncGuard<'_> {
    fn drop(&mut self) {
        // Publish Idle before clearing the flag so a new holder's Busy is never overwritten
        self.lock.status.send_replace(SyncStatus::Idle);
        self.lock.held.store(false, Ordering::Release);
    }
}

// ============================================================================
// Reconciler
// ============================================================================

/// What a pass mirrors and how hard it pushes
#[derive(Debug, Clone)]
pub struct ReconcilerSettings {
    /// Local directory whose files are mirrored
    pub directory: PathBuf,
    /// Extension selecting the files to mirror
    pub extension: Extension,
    /// Maximum upserts in flight; 1 makes upserts sequential in name order
    pub upsert_concurrency: usize,
}

impl ReconcilerSettings {
    pub fn new(directory: impl Into<PathBuf>, extension: Extension) -> Self {
        Self {
            directory: directory.into(),
            extension,
            upsert_concurrency: DEFAULT_UPSERT_CONCURRENCY,
        }
    }

    pub fn with_upsert_concurrency(mut self, n: usize) -> Self {
        self.upsert_concurrency = n.max(1);
        self
    }
}

/// Whether an upsert created a new object or overwrote an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UpsertKind {
    Created,
    Updated,
}

/// One-way synchronizer from a local directory to a remote folder
pub struct Reconciler {
    /// Source of the credentials for each pass
    credentials: Arc<dyn ICredentialProvider>,
    /// Turns credentials into an authorized store
    authorizer: Arc<dyn IAuthorizer>,
    /// Local directory access
    local: Arc<dyn ILocalEnumerator>,
    settings: ReconcilerSettings,
    lock: SyncLock,
}

impl Reconciler {
    /// Creates a new `Reconciler` with the given dependencies
    ///
    /// # Arguments
    /// * `credentials` - Credential provider (ICredentialProvider)
    /// * `authorizer` - Token exchange and store construction (IAuthorizer)
    /// * `local` - Local directory operations (ILocalEnumerator)
    /// * `settings` - Directory, extension filter and upsert concurrency
    pub fn new(
        credentials: Arc<dyn ICredentialProvider>,
        authorizer: Arc<dyn IAuthorizer>,
        local: Arc<dyn ILocalEnumerator>,
        settings: ReconcilerSettings,
    ) -> Self {
        Self {
            credentials,
            authorizer,
            local,
            settings,
            lock: SyncLock::new(),
        }
    }

    pub fn settings(&self) -> &ReconcilerSettings {
        &self.settings
    }

    /// Current busy/idle state
    pub fn status(&self) -> SyncStatus {
        self.lock.status()
    }

    /// Receiver that observes every busy/idle transition
    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.lock.subscribe()
    }

    /// Runs one reconciliation pass
    ///
    /// Returns [`SyncOutcome::Busy`] without doing any work if another pass
    /// is in progress on this instance.
    pub async fn sync(&self) -> SyncOutcome {
        let Some(_guard) = self.lock.try_acquire() else {
            info!("Sync requested while another sync is running");
            return SyncOutcome::Busy;
        };

        let run_id = SyncRunId::new();
        self.run().instrument(info_span!("sync", %run_id)).await
    }

    async fn run(&self) -> SyncOutcome {
        let start = Instant::now();
        info!(
            directory = %self.settings.directory.display(),
            extension = %self.settings.extension,
            "Starting sync"
        );

        match self.reconcile().await {
            Ok(mut report) => {
                report.duration_ms = start.elapsed().as_millis() as u64;
                info!(
                    created = report.created,
                    updated = report.updated,
                    deleted = report.deleted,
                    duration_ms = report.duration_ms,
                    "Sync completed"
                );
                SyncOutcome::Success(report)
            }
            Err(failure) => {
                error!(
                    stage = %failure.stage(),
                    error = %failure,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Sync failed"
                );
                SyncOutcome::Failed(failure)
            }
        }
    }

    async fn reconcile(&self) -> Result<SyncReport, SyncFailure> {
        // Authorize
        let credentials = self
            .credentials
            .credentials()
            .await
            .map_err(SyncFailure::Auth)?;
        let store = self
            .authorizer
            .authorize(&credentials)
            .await
            .map_err(SyncFailure::Auth)?;
        let folder = &credentials.target_folder;

        // Enumerate both sides
        let (local, remote) = tokio::try_join!(
            async {
                self.local
                    .list(&self.settings.directory, &self.settings.extension)
                    .await
                    .map_err(EnumerationError::from)
            },
            async { store.list(folder).await.map_err(EnumerationError::from) },
        )
        .map_err(SyncFailure::Enumeration)?;

        let plan = SyncPlan::compute(&local, &remote);
        info!(
            local = local.len(),
            remote = remote.len(),
            to_upsert = plan.to_upsert.len(),
            to_delete = plan.to_delete.len(),
            "Computed sync plan"
        );

        let mut report = SyncReport::default();
        self.apply_upserts(store.as_ref(), folder, &plan.to_upsert, &mut report)
            .await?;
        self.apply_deletes(store.as_ref(), &plan.to_delete, &mut report)
            .await?;

        Ok(report)
    }

    /// Upserts `names` with bounded concurrency, stopping at the first failure
    async fn apply_upserts(
        &self,
        store: &dyn IRemoteStore,
        folder: &FolderId,
        names: &[String],
        report: &mut SyncReport,
    ) -> Result<(), SyncFailure> {
        let upserts: Vec<_> = names
            .iter()
            .map(|name| async move { (name, self.upsert(store, folder, name).await) })
            .collect();
        let mut results = stream::iter(upserts)
            .buffer_unordered(self.settings.upsert_concurrency.max(1));

        while let Some((name, result)) = results.next().await {
            match result {
                Ok(UpsertKind::Created) => report.created += 1,
                Ok(UpsertKind::Updated) => report.updated += 1,
                // Dropping the stream cancels in-flight upserts and starts no new ones
                Err(source) => {
                    return Err(SyncFailure::Upsert {
                        name: name.clone(),
                        source,
                    })
                }
            }
        }

        Ok(())
    }

    /// Creates or overwrites the remote object for one local file
    #[instrument(level = "debug", skip(self, store, folder))]
    async fn upsert(
        &self,
        store: &dyn IRemoteStore,
        folder: &FolderId,
        name: &str,
    ) -> Result<UpsertKind, UpsertError> {
        let existing = store
            .find_by_name(folder, name)
            .await
            .map_err(UpsertError::Lookup)?;

        let data = self
            .local
            .read_file(&self.settings.directory, name)
            .await
            .map_err(UpsertError::Read)?;

        match existing {
            None => {
                let id = store
                    .create(folder, name, &data)
                    .await
                    .map_err(UpsertError::Write)?;
                debug!(id = %id, bytes = data.len(), "Created remote object");
                Ok(UpsertKind::Created)
            }
            Some(id) => {
                store
                    .update(&id, name, &data, Some(folder))
                    .await
                    .map_err(UpsertError::Write)?;
                debug!(id = %id, bytes = data.len(), "Updated remote object");
                Ok(UpsertKind::Updated)
            }
        }
    }

    /// Deletes `targets` in order, stopping at the first failure
    async fn apply_deletes(
        &self,
        store: &dyn IRemoteStore,
        targets: &[(String, RemoteId)],
        report: &mut SyncReport,
    ) -> Result<(), SyncFailure> {
        for (name, id) in targets {
            store
                .delete(id)
                .await
                .map_err(|source| SyncFailure::Delete {
                    name: name.clone(),
                    source,
                })?;
            debug!(name = %name, id = %id, "Deleted remote object");
            report.deleted += 1;
        }
        Ok(())
    }
}
