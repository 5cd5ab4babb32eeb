//! notemirror CLI - One-way mirror of a notes directory into a Drive folder
//!
//! Provides commands for:
//! - Running a single sync pass
//! - Running syncs on a timer until interrupted
//! - Viewing and editing the configuration
//! - Managing the service-account key in the system keyring

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;
mod wiring;

use commands::{auth::AuthCommand, config::ConfigCommand, run::RunCommand, sync::SyncCommand};
use notemirror_core::config::Config;
use output::{OutputFormat, OutputOptions};

#[derive(Debug, Parser)]
#[command(
    name = "notemirror",
    version,
    about = "Mirror a local notes directory into a Google Drive folder"
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run one sync pass
    Sync(SyncCommand),
    /// Sync now and then on every poll interval until interrupted
    Run(RunCommand),
    /// View and manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Manage the service-account key
    #[command(subcommand)]
    Auth(AuthCommand),
}

/// Picks the log filter: RUST_LOG, then -v, then `logging.level`
fn env_filter(verbose: u8, quiet: bool, configured: &str) -> EnvFilter {
    let fallback = match (verbose, quiet) {
        (0, true) => "error",
        (0, false) => configured,
        (1, _) => "debug",
        _ => "trace",
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

fn init_tracing(cli: &Cli, config: &Config) {
    let filter = env_filter(cli.verbose, cli.quiet, &config.logging.level);

    // Logs go to stderr so --json output on stdout stays parseable
    if config.logging.format == "json" {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    init_tracing(&cli, &Config::load_or_default(&config_path));

    let opts = OutputOptions {
        format: if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        },
        quiet: cli.quiet,
        config_path,
    };

    match cli.command {
        Commands::Sync(cmd) => cmd.execute(&opts).await,
        Commands::Run(cmd) => cmd.execute(&opts).await,
        Commands::Config(cmd) => cmd.execute(&opts).await,
        Commands::Auth(cmd) => cmd.execute(&opts).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "notemirror",
            "sync",
            "--json",
            "-vv",
            "--config",
            "/tmp/nm.yaml",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/nm.yaml")));
        assert!(matches!(cli.command, Commands::Sync(_)));
    }

    #[test]
    fn test_parse_nested_subcommands() {
        let cli = Cli::try_parse_from(["notemirror", "config", "set", "sync.poll_interval", "60"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config(ConfigCommand::Set { ref key, ref value })
                if key == "sync.poll_interval" && value == "60"
        ));

        let cli = Cli::try_parse_from(["notemirror", "auth", "store-key", "key.pem"]).unwrap();
        assert!(matches!(cli.command, Commands::Auth(AuthCommand::StoreKey { .. })));
    }

    #[test]
    fn test_run_accepts_interval_override() {
        let cli = Cli::try_parse_from(["notemirror", "run", "--interval", "15"]).unwrap();
        match cli.command {
            Commands::Run(cmd) => assert_eq!(cmd.interval, Some(15)),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
