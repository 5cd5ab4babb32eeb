//! Configuration module for notemirror.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::newtypes::{Extension, FolderId};

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for notemirror.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub local: LocalConfig,
    pub remote: RemoteConfig,
    pub credentials: CredentialsConfig,
    pub sync: SyncConfig,
    pub logging: LoggingConfig,
}

/// The local directory being mirrored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    /// Directory whose files are mirrored. A leading `~` is expanded.
    pub directory: PathBuf,
    /// Extension of the files to mirror, without the leading dot.
    pub extension: String,
}

/// The remote store and its endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// ID of the remote folder. `None` until the user sets it.
    pub folder_id: Option<String>,
    /// Base URL of the Drive API.
    pub api_base_url: String,
    /// OAuth token endpoint for the JWT bearer grant.
    pub token_url: String,
    /// Per-request HTTP timeout in seconds.
    pub request_timeout_secs: u64,
}

/// Where the service-account secret comes from.
///
/// Resolution order: `key_file`, then inline `client_email` + `private_key`,
/// then the OS keyring entry for `client_email`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    /// Service account e-mail used as the assertion issuer.
    pub client_email: Option<String>,
    /// Inline PEM private key.
    pub private_key: Option<String>,
    /// Path to a service-account JSON key file.
    pub key_file: Option<PathBuf>,
}

/// Reconciliation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Maximum number of upserts in flight.
    pub upsert_concurrency: usize,
    /// Seconds between timer-triggered syncs in `run` mode.
    pub poll_interval: u64,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
    /// Output format: `text` or `json`.
    pub format: String,
}

// ---------------------------------------------------------------------------
// Config::load()
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/notemirror/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("notemirror")
            .join("config.yaml")
    }

    /// Write the configuration as YAML to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// The local directory with a leading `~` expanded to the home directory.
    pub fn local_directory(&self) -> PathBuf {
        expand_tilde(&self.local.directory)
    }

    /// The configured extension filter.
    pub fn extension(&self) -> Result<Extension, DomainError> {
        Extension::new(self.local.extension.clone())
    }

    /// The configured remote folder.
    pub fn folder_id(&self) -> Result<FolderId, DomainError> {
        match &self.remote.folder_id {
            Some(id) => FolderId::new(id.clone()),
            None => Err(DomainError::ValidationFailed(
                "remote.folder_id is not set".to_string(),
            )),
        }
    }
}

/// Expand a leading `~` component to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            directory: dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("~"))
                .join("notes"),
            extension: "md".to_string(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            folder_id: None,
            api_base_url: "https://www.googleapis.com".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            upsert_concurrency: 4,
            poll_interval: 300,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"sync.poll_interval"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Valid values for `logging.format`.
const VALID_LOG_FORMATS: &[&str] = &["text", "json"];

/// Upper bound for `sync.upsert_concurrency`.
const MAX_UPSERT_CONCURRENCY: usize = 32;

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid. Credentials are only
    /// checked for shape; whether a keyring entry exists is decided at sync time.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- local ---
        let dir = self.local_directory();
        if !dir.is_dir() {
            errors.push(ValidationError {
                field: "local.directory".into(),
                message: format!("directory does not exist: {}", dir.display()),
            });
        }
        if let Err(e) = self.extension() {
            errors.push(ValidationError {
                field: "local.extension".into(),
                message: e.to_string(),
            });
        }

        // --- remote ---
        match &self.remote.folder_id {
            None => errors.push(ValidationError {
                field: "remote.folder_id".into(),
                message: "must be set".into(),
            }),
            Some(id) => {
                if let Err(e) = FolderId::new(id.clone()) {
                    errors.push(ValidationError {
                        field: "remote.folder_id".into(),
                        message: e.to_string(),
                    });
                }
            }
        }
        for (field, value) in [
            ("remote.api_base_url", &self.remote.api_base_url),
            ("remote.token_url", &self.remote.token_url),
        ] {
            if let Err(e) = url::Url::parse(value) {
                errors.push(ValidationError {
                    field: field.into(),
                    message: format!("invalid URL '{value}': {e}"),
                });
            }
        }
        if self.remote.request_timeout_secs == 0 {
            errors.push(ValidationError {
                field: "remote.request_timeout_secs".into(),
                message: "must be greater than 0".into(),
            });
        }

        // --- credentials ---
        if self.credentials.key_file.is_none() && self.credentials.client_email.is_none() {
            errors.push(ValidationError {
                field: "credentials".into(),
                message: "either credentials.key_file or credentials.client_email must be set"
                    .into(),
            });
        }
        if let Some(email) = &self.credentials.client_email {
            if email.trim().is_empty() {
                errors.push(ValidationError {
                    field: "credentials.client_email".into(),
                    message: "must not be empty".into(),
                });
            }
        }
        if let Some(path) = &self.credentials.key_file {
            let path = expand_tilde(path);
            if !path.is_file() {
                errors.push(ValidationError {
                    field: "credentials.key_file".into(),
                    message: format!("file does not exist: {}", path.display()),
                });
            }
        }

        // --- sync ---
        let concurrency = self.sync.upsert_concurrency;
        if concurrency == 0 || concurrency > MAX_UPSERT_CONCURRENCY {
            errors.push(ValidationError {
                field: "sync.upsert_concurrency".into(),
                message: format!("must be in range 1..={MAX_UPSERT_CONCURRENCY}"),
            });
        }
        if self.sync.poll_interval == 0 {
            errors.push(ValidationError {
                field: "sync.poll_interval".into(),
                message: "must be greater than 0".into(),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }
        if !VALID_LOG_FORMATS.contains(&self.logging.format.as_str()) {
            errors.push(ValidationError {
                field: "logging.format".into(),
                message: format!(
                    "invalid format '{}'; valid options: {}",
                    self.logging.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use notemirror_core::config::ConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = ConfigBuilder::new()
///     .local_directory(PathBuf::from("/home/user/notes"))
///     .remote_folder_id("0BwwA4oUTeiV1TGRPeTVjaWRDY1E")
///     .credentials_client_email("svc@project.iam.gserviceaccount.com")
///     .logging_level("debug")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- local ---

    pub fn local_directory(mut self, directory: PathBuf) -> Self {
        self.config.local.directory = directory;
        self
    }

    pub fn local_extension(mut self, extension: impl Into<String>) -> Self {
        self.config.local.extension = extension.into();
        self
    }

    // --- remote ---

    pub fn remote_folder_id(mut self, folder_id: impl Into<String>) -> Self {
        self.config.remote.folder_id = Some(folder_id.into());
        self
    }

    pub fn remote_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.remote.api_base_url = url.into();
        self
    }

    pub fn remote_token_url(mut self, url: impl Into<String>) -> Self {
        self.config.remote.token_url = url.into();
        self
    }

    pub fn remote_request_timeout_secs(mut self, seconds: u64) -> Self {
        self.config.remote.request_timeout_secs = seconds;
        self
    }

    // --- credentials ---

    pub fn credentials_client_email(mut self, email: impl Into<String>) -> Self {
        self.config.credentials.client_email = Some(email.into());
        self
    }

    pub fn credentials_private_key(mut self, pem: impl Into<String>) -> Self {
        self.config.credentials.private_key = Some(pem.into());
        self
    }

    pub fn credentials_key_file(mut self, path: PathBuf) -> Self {
        self.config.credentials.key_file = Some(path);
        self
    }

    // --- sync ---

    pub fn sync_upsert_concurrency(mut self, n: usize) -> Self {
        self.config.sync.upsert_concurrency = n;
        self
    }

    pub fn sync_poll_interval(mut self, seconds: u64) -> Self {
        self.config.sync.poll_interval = seconds;
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn logging_format(mut self, format: impl Into<String>) -> Self {
        self.config.logging.format = format.into();
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
