//! Service credentials
//!
//! [`Credentials`] is produced by an `ICredentialProvider` at the start of
//! every sync and handed to the authorizer. It is never persisted by the
//! engine and never printed: the `Debug` impl redacts the private key.

use std::fmt;

use super::newtypes::FolderId;

/// Service identity, signing key and target folder for one sync
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Service account identity (e.g. `svc@project.iam.gserviceaccount.com`)
    pub client_identity: String,
    /// PEM-encoded RSA private key used to sign token assertions
    pub private_key: String,
    /// Remote folder that mirrors the local directory
    pub target_folder: FolderId,
}

impl Credentials {
    pub fn new(
        client_identity: impl Into<String>,
        private_key: impl Into<String>,
        target_folder: FolderId,
    ) -> Self {
        Self {
            client_identity: client_identity.into(),
            private_key: private_key.into(),
            target_folder,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_identity", &self.client_identity)
            .field("private_key", &"<redacted>")
            .field("target_folder", &self.target_folder)
            .finish()
    }
}
