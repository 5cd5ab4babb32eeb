//! Run command - Timer-triggered syncs until interrupted
//!
//! Provides the `notemirror run` CLI command which syncs immediately and
//! then every `sync.poll_interval` seconds. SIGINT or SIGTERM stops the loop
//! after the pass in flight completes.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use notemirror_core::config::Config;
use notemirror_sync::scheduler::PeriodicSync;

use crate::output::OutputOptions;
use crate::wiring;

#[derive(Debug, Args)]
pub struct RunCommand {
    /// Seconds between syncs (overrides sync.poll_interval)
    #[arg(long)]
    pub interval: Option<u64>,
}

impl RunCommand {
    pub async fn execute(&self, opts: &OutputOptions) -> Result<ExitCode> {
        let formatter = opts.formatter();

        let config = Config::load(&opts.config_path).with_context(|| {
            format!(
                "Failed to load configuration from {}",
                opts.config_path.display()
            )
        })?;

        let interval_secs = self.interval.unwrap_or(config.sync.poll_interval);
        if interval_secs == 0 {
            bail!("Poll interval must be greater than 0");
        }

        let reconciler = Arc::new(wiring::reconciler(&config)?);
        let scheduler = PeriodicSync::new(reconciler, Duration::from_secs(interval_secs));

        formatter.info(&format!(
            "Syncing {} every {}s (Ctrl+C to stop)",
            config.local_directory().display(),
            interval_secs
        ));

        let shutdown = CancellationToken::new();
        tokio::spawn(shutdown_signal(shutdown.clone()));

        let passes = scheduler.run(shutdown).await;
        info!(passes, "Stopped");

        if opts.is_json() {
            formatter.print_json(&serde_json::json!({
                "success": true,
                "passes": passes,
            }));
        } else {
            formatter.success(&format!("Stopped after {passes} sync passes"));
        }

        Ok(ExitCode::SUCCESS)
    }
}

/// Cancels `token` on SIGINT or SIGTERM
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C)");
        }
        _ = terminate => {
            info!("Received SIGTERM");
        }
    }

    token.cancel();
}
