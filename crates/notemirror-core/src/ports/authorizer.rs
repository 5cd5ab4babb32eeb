//! Authorizer port
//!
//! Turns [`Credentials`] into a remote store client that carries a valid
//! access token.

use std::sync::Arc;

use crate::domain::credentials::Credentials;
use crate::domain::errors::AuthError;
use crate::ports::remote_store::IRemoteStore;

/// Port trait for obtaining an authorized remote store
#[async_trait::async_trait]
pub trait IAuthorizer: Send + Sync {
    /// Exchanges `credentials` for an authorized store client
    ///
    /// # Errors
    /// - [`AuthError::MalformedCredentials`] if the identity or key is unusable
    /// - [`AuthError::ExchangeRejected`] if the token endpoint refuses or fails
    async fn authorize(&self, credentials: &Credentials)
        -> Result<Arc<dyn IRemoteStore>, AuthError>;
}
