//! Credential provider port
//!
//! The reconciler asks for credentials at the start of every pass, so a
//! provider backed by a keyring or a key file picks up rotated secrets
//! without restarting the host.

use crate::domain::credentials::Credentials;
use crate::domain::errors::AuthError;

/// Port trait for supplying credentials
#[async_trait::async_trait]
pub trait ICredentialProvider: Send + Sync {
    /// Returns the credentials to use for one sync
    ///
    /// # Errors
    /// [`AuthError::CredentialsUnavailable`] if the secret cannot be obtained
    async fn credentials(&self) -> Result<Credentials, AuthError>;
}

/// Provider that hands out a fixed value built by the host
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    credentials: Credentials,
}

impl StaticCredentials {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

#[async_trait::async_trait]
impl ICredentialProvider for StaticCredentials {
    async fn credentials(&self) -> Result<Credentials, AuthError> {
        Ok(self.credentials.clone())
    }
}
