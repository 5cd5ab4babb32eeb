//! Adapter wiring shared by the commands
//!
//! Turns a [`Config`] into the credential provider, authorizer and
//! reconciler the commands drive.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tracing::debug;

use notemirror_core::config::{expand_tilde, Config};
use notemirror_core::domain::credentials::Credentials;
use notemirror_core::domain::errors::AuthError;
use notemirror_core::domain::newtypes::FolderId;
use notemirror_core::ports::credential_provider::{ICredentialProvider, StaticCredentials};
use notemirror_drive::auth::{DriveAuthorizer, ServiceAccountKey};
use notemirror_drive::keyring_store::KeyringCredentialProvider;
use notemirror_sync::engine::{Reconciler, ReconcilerSettings};
use notemirror_sync::filesystem::LocalDirectoryAdapter;

/// Reads a service-account JSON key file on every call, so a rotated key is
/// picked up by the next sync
#[derive(Debug, Clone)]
pub struct KeyFileCredentials {
    path: PathBuf,
    target_folder: FolderId,
}

impl KeyFileCredentials {
    pub fn new(path: PathBuf, target_folder: FolderId) -> Self {
        Self {
            path,
            target_folder,
        }
    }
}

#[async_trait]
impl ICredentialProvider for KeyFileCredentials {
    async fn credentials(&self) -> Result<Credentials, AuthError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read key file {}", self.path.display()))
            .map_err(AuthError::CredentialsUnavailable)?;
        let key =
            ServiceAccountKey::from_json(&content).map_err(AuthError::CredentialsUnavailable)?;
        Ok(Credentials::new(
            key.client_email,
            key.private_key,
            self.target_folder.clone(),
        ))
    }
}

/// Resolves where credentials come from: key file, then inline key, then keyring
pub fn credential_provider(config: &Config) -> Result<Arc<dyn ICredentialProvider>> {
    let folder = config
        .folder_id()
        .context("remote.folder_id is missing or invalid")?;
    let creds = &config.credentials;

    if let Some(path) = &creds.key_file {
        let path = expand_tilde(path);
        debug!(key_file = %path.display(), "Using service-account key file");
        return Ok(Arc::new(KeyFileCredentials::new(path, folder)));
    }

    let Some(identity) = creds.client_email.as_deref() else {
        bail!("Set credentials.key_file or credentials.client_email in the configuration");
    };

    match &creds.private_key {
        Some(pem) => {
            debug!(identity, "Using inline private key from configuration");
            Ok(Arc::new(StaticCredentials::new(Credentials::new(
                identity,
                pem.as_str(),
                folder,
            ))))
        }
        None => {
            debug!(identity, "Using private key from system keyring");
            Ok(Arc::new(KeyringCredentialProvider::new(identity, folder)))
        }
    }
}

pub fn authorizer(config: &Config) -> Result<Arc<DriveAuthorizer>> {
    // A zero timeout would fail every request before it is sent
    if config.remote.request_timeout_secs == 0 {
        bail!("remote.request_timeout_secs must be greater than 0");
    }
    let authorizer = DriveAuthorizer::with_endpoints(
        config.remote.token_url.as_str(),
        config.remote.api_base_url.as_str(),
        Duration::from_secs(config.remote.request_timeout_secs),
    )?;
    Ok(Arc::new(authorizer))
}

pub fn reconciler(config: &Config) -> Result<Reconciler> {
    let extension = config
        .extension()
        .context("local.extension is invalid")?;
    let settings = ReconcilerSettings::new(config.local_directory(), extension)
        .with_upsert_concurrency(config.sync.upsert_concurrency);

    Ok(Reconciler::new(
        credential_provider(config)?,
        authorizer(config)?,
        Arc::new(LocalDirectoryAdapter::new()),
        settings,
    ))
}
