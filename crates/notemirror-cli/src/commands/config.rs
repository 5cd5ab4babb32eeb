//! Config command - View and manage notemirror configuration
//!
//! Provides the `notemirror config` CLI command which:
//! 1. Shows the current configuration (YAML or JSON), with secrets redacted
//! 2. Sets individual configuration values via dot-notation keys
//! 3. Validates the configuration file and reports errors

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use tracing::info;

use notemirror_core::config::Config;

use crate::output::OutputOptions;

const REDACTED: &str = "<redacted>";

/// Keys accepted by `config set`, with a short description
const SUPPORTED_KEYS: &[(&str, &str)] = &[
    ("local.directory", "Directory to mirror"),
    ("local.extension", "Extension of mirrored files (no dot)"),
    ("remote.folder_id", "Target Drive folder ID"),
    ("remote.api_base_url", "Drive API base URL"),
    ("remote.token_url", "OAuth token endpoint"),
    ("remote.request_timeout_secs", "Per-request timeout in seconds"),
    ("credentials.client_email", "Service-account e-mail"),
    ("credentials.key_file", "Service-account JSON key file"),
    ("sync.upsert_concurrency", "Uploads in flight (1-32)"),
    ("sync.poll_interval", "Seconds between syncs for 'run'"),
    ("logging.level", "trace|debug|info|warn|error"),
    ("logging.format", "text|json"),
];

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "sync.poll_interval")
        key: String,
        /// New value
        value: String,
    },
    /// Validate configuration file
    Validate,
}

impl ConfigCommand {
    pub async fn execute(&self, opts: &OutputOptions) -> Result<ExitCode> {
        match self {
            ConfigCommand::Show => self.execute_show(opts),
            ConfigCommand::Set { key, value } => self.execute_set(key, value, opts),
            ConfigCommand::Validate => self.execute_validate(opts),
        }
    }

    fn execute_show(&self, opts: &OutputOptions) -> Result<ExitCode> {
        let formatter = opts.formatter();
        let config_path = &opts.config_path;
        let config = redacted(Config::load_or_default(config_path));

        info!(config_path = %config_path.display(), "Showing configuration");

        if opts.is_json() {
            let json = serde_json::to_value(&config)
                .context("Failed to serialize configuration to JSON")?;
            formatter.print_json(&json);
        } else {
            formatter.success(&format!("Configuration ({})", config_path.display()));
            formatter.info("");

            let yaml = serde_yaml::to_string(&config)
                .context("Failed to serialize configuration to YAML")?;
            for line in yaml.lines() {
                formatter.info(line);
            }
        }

        Ok(ExitCode::SUCCESS)
    }

    fn execute_set(&self, key: &str, value: &str, opts: &OutputOptions) -> Result<ExitCode> {
        let formatter = opts.formatter();
        let config_path = &opts.config_path;
        let mut config = Config::load_or_default(config_path);

        info!(key = %key, value = %value, "Setting configuration value");

        if let Err(e) = apply_config_value(&mut config, key, value) {
            if opts.is_json() {
                formatter.print_json(&serde_json::json!({
                    "success": false,
                    "key": key,
                    "value": value,
                    "error": format!("{e:#}"),
                }));
            } else {
                formatter.error(&format!("Failed to set '{}': {:#}", key, e));
                formatter.info("");
                formatter.info("Supported keys:");
                for (name, description) in SUPPORTED_KEYS {
                    formatter.info(&format!("  {name:<30} - {description}"));
                }
            }
            return Ok(ExitCode::FAILURE);
        }

        // Only the field being set is checked; the rest of the file may still be incomplete
        let errors: Vec<String> = config
            .validate()
            .into_iter()
            .filter(|e| e.field == key)
            .map(|e| e.message)
            .collect();

        if !errors.is_empty() {
            if opts.is_json() {
                formatter.print_json(&serde_json::json!({
                    "success": false,
                    "key": key,
                    "value": value,
                    "errors": errors,
                }));
            } else {
                formatter.error(&format!(
                    "Invalid value for '{}': {}",
                    key,
                    errors.join("; ")
                ));
            }
            return Ok(ExitCode::FAILURE);
        }

        config
            .save(config_path)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;

        if opts.is_json() {
            formatter.print_json(&serde_json::json!({
                "success": true,
                "key": key,
                "value": value,
                "config_path": config_path.display().to_string(),
            }));
        } else {
            formatter.success(&format!("Set {} = {}", key, value));
            formatter.info(&format!("Saved to {}", config_path.display()));
        }

        Ok(ExitCode::SUCCESS)
    }

    fn execute_validate(&self, opts: &OutputOptions) -> Result<ExitCode> {
        let formatter = opts.formatter();
        let config_path = &opts.config_path;

        let config = match Config::load(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                let message = if config_path.exists() {
                    format!("Failed to parse configuration: {e:#}")
                } else {
                    "Configuration file not found".to_string()
                };
                if opts.is_json() {
                    formatter.print_json(&serde_json::json!({
                        "valid": false,
                        "config_path": config_path.display().to_string(),
                        "errors": [message],
                    }));
                } else {
                    formatter.error(&message);
                    formatter.info(&format!("File: {}", config_path.display()));
                }
                return Ok(ExitCode::FAILURE);
            }
        };

        info!(config_path = %config_path.display(), "Validating configuration");

        let errors = config.validate();

        if opts.is_json() {
            let error_strings: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            formatter.print_json(&serde_json::json!({
                "valid": errors.is_empty(),
                "config_path": config_path.display().to_string(),
                "errors": error_strings,
            }));
        } else if errors.is_empty() {
            formatter.success("Configuration is valid");
            formatter.info(&format!("File: {}", config_path.display()));
        } else {
            formatter.error(&format!(
                "Configuration has {} error{}:",
                errors.len(),
                if errors.len() == 1 { "" } else { "s" }
            ));
            formatter.info(&format!("File: {}", config_path.display()));
            formatter.info("");
            for error in &errors {
                formatter.info(&format!("  {} - {}", error.field, error.message));
            }
        }

        Ok(if errors.is_empty() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        })
    }
}

fn redacted(mut config: Config) -> Config {
    if config.credentials.private_key.is_some() {
        config.credentials.private_key = Some(REDACTED.to_string());
    }
    config
}

/// `None` for an empty value or the literal "none"
fn optional(value: &str) -> Option<String> {
    if value.is_empty() || value == "none" {
        None
    } else {
        Some(value.to_string())
    }
}

/// Apply a dot-notation key/value pair to a Config struct
fn apply_config_value(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        // --- local ---
        "local.directory" => {
            config.local.directory = PathBuf::from(value);
        }
        "local.extension" => {
            config.local.extension = value.trim_start_matches('.').to_string();
        }

        // --- remote ---
        "remote.folder_id" => {
            config.remote.folder_id = optional(value);
        }
        "remote.api_base_url" => {
            config.remote.api_base_url = value.to_string();
        }
        "remote.token_url" => {
            config.remote.token_url = value.to_string();
        }
        "remote.request_timeout_secs" => {
            config.remote.request_timeout_secs = value
                .parse::<u64>()
                .context("Expected a positive integer for remote.request_timeout_secs")?;
        }

        // --- credentials ---
        "credentials.client_email" => {
            config.credentials.client_email = optional(value);
        }
        "credentials.key_file" => {
            config.credentials.key_file = optional(value).map(PathBuf::from);
        }
        "credentials.private_key" => {
            bail!("Private keys are not set here; use 'notemirror auth store-key <pem-file>'");
        }

        // --- sync ---
        "sync.upsert_concurrency" => {
            config.sync.upsert_concurrency = value
                .parse::<usize>()
                .context("Expected a positive integer for sync.upsert_concurrency")?;
        }
        "sync.poll_interval" => {
            config.sync.poll_interval = value
                .parse::<u64>()
                .context("Expected a positive integer for sync.poll_interval")?;
        }

        // --- logging ---
        "logging.level" => {
            config.logging.level = value.to_string();
        }
        "logging.format" => {
            config.logging.format = value.to_string();
        }

        _ => {
            bail!("Unknown configuration key: '{}'", key);
        }
    }

    Ok(())
}
