//! Sync command - Run one reconciliation pass
//!
//! Provides the `notemirror sync` CLI command which:
//! 1. Loads configuration
//! 2. Wires the credential provider, Drive authorizer and local adapter
//! 3. Runs the Reconciler once and reports the outcome

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use notemirror_core::config::Config;
use notemirror_core::domain::outcome::SyncOutcome;

use crate::output::{OutputFormatter, OutputOptions};
use crate::wiring;

#[derive(Debug, Args)]
pub struct SyncCommand {}

impl SyncCommand {
    pub async fn execute(&self, opts: &OutputOptions) -> Result<ExitCode> {
        let formatter = opts.formatter();

        let config = Config::load(&opts.config_path).with_context(|| {
            format!(
                "Failed to load configuration from {}",
                opts.config_path.display()
            )
        })?;
        info!(config_path = %opts.config_path.display(), "Loaded configuration");

        let reconciler = wiring::reconciler(&config)?;
        let outcome = reconciler.sync().await;

        if opts.is_json() {
            formatter.print_json(&outcome_json(&outcome));
        } else {
            report_human(&outcome, &*formatter);
        }

        Ok(exit_code(&outcome))
    }
}

pub(crate) fn exit_code(outcome: &SyncOutcome) -> ExitCode {
    if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

pub(crate) fn outcome_json(outcome: &SyncOutcome) -> serde_json::Value {
    match outcome {
        SyncOutcome::Success(report) => serde_json::json!({
            "success": true,
            "status": "success",
            "message": outcome.notice(),
            "report": report,
        }),
        SyncOutcome::Busy => serde_json::json!({
            "success": false,
            "status": "busy",
            "message": outcome.notice(),
        }),
        SyncOutcome::Failed(failure) => serde_json::json!({
            "success": false,
            "status": "failed",
            "message": outcome.notice(),
            "stage": failure.stage(),
            "error": format!("{failure}"),
        }),
    }
}

fn report_human(outcome: &SyncOutcome, formatter: &dyn OutputFormatter) {
    match outcome {
        SyncOutcome::Success(report) => {
            formatter.success(&outcome.notice());
            formatter.info(&format!("Created:  {}", report.created));
            formatter.info(&format!("Updated:  {}", report.updated));
            formatter.info(&format!("Deleted:  {}", report.deleted));
            formatter.info(&format!("Duration: {}ms", report.duration_ms));
        }
        SyncOutcome::Busy => formatter.warn(&outcome.notice()),
        SyncOutcome::Failed(failure) => {
            formatter.error(&outcome.notice());
            formatter.info(&failure.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notemirror_core::domain::errors::AuthError;
    use notemirror_core::domain::outcome::{SyncFailure, SyncReport};

    #[test]
    fn test_success_json_carries_report() {
        let outcome = SyncOutcome::Success(SyncReport {
            created: 2,
            updated: 1,
            deleted: 1,
            duration_ms: 40,
        });
        let json = outcome_json(&outcome);
        assert_eq!(json["status"], "success");
        assert_eq!(json["report"]["created"], 2);
        assert_eq!(json["message"], "Sync completed successfully!");
    }

    #[test]
    fn test_failure_json_names_stage() {
        let outcome = SyncOutcome::Failed(SyncFailure::Auth(AuthError::MalformedCredentials(
            "bad key".into(),
        )));
        let json = outcome_json(&outcome);
        assert_eq!(json["success"], false);
        assert_eq!(json["stage"]["stage"], "auth");
        assert!(json["error"].as_str().unwrap().contains("bad key"));
    }

    #[test]
    fn test_busy_and_failure_exit_non_zero() {
        assert_eq!(exit_code(&SyncOutcome::Busy), ExitCode::FAILURE);
        assert_eq!(
            exit_code(&SyncOutcome::Success(SyncReport::default())),
            ExitCode::SUCCESS
        );
    }
}
