//! notemirror Core - Domain logic and port definitions
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain types** - `Credentials`, `LocalFileSet`, `RemoteFileIndex`, `SyncPlan`, `SyncOutcome`
//! - **Port definitions** - Traits for adapters: `IRemoteStore`, `IAuthorizer`,
//!   `ILocalEnumerator`, `ICredentialProvider`
//! - **Configuration** - The YAML settings file shared by the CLI and the engine
//!
//! # Architecture
//!
//! The domain module is pure: computing a [`domain::SyncPlan`] performs no I/O.
//! Ports define the trait interfaces that adapter crates implement, and the
//! reconciler in `notemirror-sync` orchestrates them.

pub mod config;
pub mod domain;
pub mod ports;
