//! cronmon CLI: status table, log viewer, or watch loop.
//!
//! Logging: set `RUST_LOG=cronmon=debug,cronmon_sniffer=debug` (or pass `--verbose`)
//! to see evaluation logs on stderr. Stdout only carries the table or JSON.

mod cli;
mod commands;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cronmon::{MonitorConfig, load_settings, resolve_config_home};

use crate::cli::{Cli, Command};

const DEFAULT_LOG_FILTER: &str = "cronmon=info,cronmon_sniffer=warn";
const VERBOSE_LOG_FILTER: &str = "cronmon=debug,cronmon_sniffer=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG overrides; --verbose => debug for both crates.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose {
            VERBOSE_LOG_FILTER
        } else {
            DEFAULT_LOG_FILTER
        })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config_home = resolve_config_home(cli.conf.as_deref());
    let mut config = load_settings(&config_home).resolve(&config_home);
    apply_overrides(&cli, &mut config);
    tracing::debug!(
        config_home = %config_home.display(),
        jobs_file = %config.jobs_file.display(),
        max_concurrent = config.batch.max_concurrent,
        job_timeout_secs = config.batch.job_timeout.as_secs(),
        "effective configuration"
    );

    match cli.command.unwrap_or(Command::Status {
        group: false,
        json: false,
    }) {
        Command::Status { group, json } => commands::run_status(&config, group, json).await,
        Command::Log { number } => commands::run_log(&config, number).await,
        Command::Watch { interval, group } => {
            if let Some(secs) = interval {
                config.refresh_interval = Duration::from_secs(secs.max(1));
            }
            commands::run_watch(&config, group).await
        }
    }
}

fn apply_overrides(cli: &Cli, config: &mut MonitorConfig) {
    if let Some(jobs) = &cli.jobs {
        config.jobs_file = if jobs.is_absolute() {
            jobs.clone()
        } else {
            std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(jobs)
        };
    }
    if let Some(secs) = cli.timeout {
        config.batch.job_timeout = Duration::from_secs(secs.max(1));
    }
    if let Some(limit) = cli.max_concurrent {
        config.batch.max_concurrent = limit.max(1);
    }
}
