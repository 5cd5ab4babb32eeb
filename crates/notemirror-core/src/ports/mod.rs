//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. The reconciler depends only on these traits;
//! their implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IRemoteStore`] - Folder-scoped object operations on the remote store
//! - [`IAuthorizer`] - Exchanges credentials for an authorized remote store
//! - [`ILocalEnumerator`] - Lists and reads synchronizable local files
//! - [`ICredentialProvider`] - Yields the credentials for one sync

pub mod authorizer;
pub mod credential_provider;
pub mod local_enumerator;
pub mod remote_store;

pub use authorizer::IAuthorizer;
pub use credential_provider::{ICredentialProvider, StaticCredentials};
pub use local_enumerator::ILocalEnumerator;
pub use remote_store::IRemoteStore;
