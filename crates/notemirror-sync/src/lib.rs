//! notemirror Sync - One-way reconciliation engine
//!
//! Provides:
//! - The [`engine::Reconciler`], which converges a remote folder onto a local directory
//! - Mutual exclusion of sync passes with a busy/idle status signal
//! - A local directory enumerator backed by `tokio::fs`
//! - A periodic runner for timer-triggered syncs
//!
//! ## Modules
//!
//! - [`engine`] - Reconciler, sync lock and upsert/delete application
//! - [`filesystem`] - Local directory adapter (extension filter, file reads)
//! - [`scheduler`] - Interval-driven sync loop with graceful shutdown

pub mod engine;
pub mod filesystem;
pub mod scheduler;

pub use engine::{Reconciler, ReconcilerSettings, SyncLock};
pub use filesystem::LocalDirectoryAdapter;
pub use scheduler::PeriodicSync;
