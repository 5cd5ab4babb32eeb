//! Private key storage in the system keyring
//!
//! The PEM key is stored under the service name "notemirror" with the
//! service-account e-mail as the username, so the config file only ever
//! carries the identity.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use tracing::{debug, info};

use notemirror_core::domain::credentials::Credentials;
use notemirror_core::domain::errors::AuthError;
use notemirror_core::domain::newtypes::FolderId;
use notemirror_core::ports::credential_provider::ICredentialProvider;

/// Keyring service name for storing private keys
pub const KEYRING_SERVICE: &str = "notemirror";

// ============================================================================
// KeyringKeyStorage
// ============================================================================

/// Stores and retrieves service-account private keys from the system keyring
///
/// Uses the `keyring` crate to store keys in the OS credential store
/// (e.g., GNOME Keyring, KDE Wallet, macOS Keychain).
pub struct KeyringKeyStorage;

impl KeyringKeyStorage {
    /// Stores the PEM key for `client_identity`
    pub fn store(client_identity: &str, private_key_pem: &str) -> Result<()> {
        let entry = keyring::Entry::new(KEYRING_SERVICE, client_identity)
            .context("Failed to create keyring entry")?;

        entry
            .set_password(private_key_pem)
            .context("Failed to store private key in keyring")?;

        debug!(identity = client_identity, "Stored private key in keyring");
        Ok(())
    }

    /// Loads the PEM key for `client_identity`
    ///
    /// # Returns
    /// `Some(pem)` if found, `None` if there is no entry
    pub fn load(client_identity: &str) -> Result<Option<String>> {
        let entry = keyring::Entry::new(KEYRING_SERVICE, client_identity)
            .context("Failed to create keyring entry")?;

        match entry.get_password() {
            Ok(pem) => {
                debug!(identity = client_identity, "Loaded private key from keyring");
                Ok(Some(pem))
            }
            Err(keyring::Error::NoEntry) => {
                debug!(identity = client_identity, "No private key in keyring");
                Ok(None)
            }
            Err(e) => Err(anyhow::Error::new(e).context("Failed to read from keyring")),
        }
    }

    /// Removes the key for `client_identity`; a missing entry is not an error
    pub fn clear(client_identity: &str) -> Result<()> {
        let entry = keyring::Entry::new(KEYRING_SERVICE, client_identity)
            .context("Failed to create keyring entry")?;

        match entry.delete_credential() {
            Ok(()) => {
                info!(identity = client_identity, "Cleared private key from keyring");
                Ok(())
            }
            Err(keyring::Error::NoEntry) => {
                debug!(identity = client_identity, "No private key to clear");
                Ok(())
            }
            Err(e) => Err(anyhow::Error::new(e).context("Failed to delete from keyring")),
        }
    }
}

// ============================================================================
// KeyringCredentialProvider
// ============================================================================

/// Credential provider that reads the private key from the keyring on
/// every call
#[derive(Debug, Clone)]
pub struct KeyringCredentialProvider {
    client_identity: String,
    target_folder: FolderId,
}

impl KeyringCredentialProvider {
    pub fn new(client_identity: impl Into<String>, target_folder: FolderId) -> Self {
        Self {
            client_identity: client_identity.into(),
            target_folder,
        }
    }
}

#[async_trait]
impl ICredentialProvider for KeyringCredentialProvider {
    async fn credentials(&self) -> Result<Credentials, AuthError> {
        let identity = self.client_identity.clone();
        let lookup = identity.clone();

        // Secret-service calls block on D-Bus
        let pem = tokio::task::spawn_blocking(move || KeyringKeyStorage::load(&lookup))
            .await
            .map_err(|e| AuthError::CredentialsUnavailable(anyhow::Error::new(e)))?
            .map_err(AuthError::CredentialsUnavailable)?
            .ok_or_else(|| {
                AuthError::CredentialsUnavailable(anyhow!(
                    "no private key stored in keyring for {identity}"
                ))
            })?;

        Ok(Credentials::new(identity, pem, self.target_folder.clone()))
    }
}
