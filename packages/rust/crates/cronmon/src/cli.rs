use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cronmon")]
#[command(about = "Show whether recurring cron jobs ran, are running, or failed in their current window.")]
pub(crate) struct Cli {
    /// Override config directory (default: $CRONMON_CONFIG_HOME or the platform config dir).
    #[arg(long, global = true)]
    pub(crate) conf: Option<PathBuf>,

    /// Jobs file to load instead of the configured one.
    #[arg(long, global = true)]
    pub(crate) jobs: Option<PathBuf>,

    /// Per-job evaluation timeout in seconds.
    #[arg(long, global = true)]
    pub(crate) timeout: Option<u64>,

    /// Max jobs evaluated at once.
    #[arg(long, global = true)]
    pub(crate) max_concurrent: Option<usize>,

    /// Debug logging on stderr (ignored when RUST_LOG is set).
    #[arg(short, long, global = true)]
    pub(crate) verbose: bool,

    #[command(subcommand)]
    pub(crate) command: Option<Command>,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Evaluate every job once and print the status table (default).
    Status {
        /// Section rows by frequency.
        #[arg(long)]
        group: bool,

        /// Print JSON instead of the table.
        #[arg(long, conflicts_with = "group")]
        json: bool,
    },
    /// Open the latest log of job N (as numbered in the table) in the pager.
    Log {
        /// 1-based job number.
        number: usize,
    },
    /// Refresh the table periodically until Ctrl+C.
    Watch {
        /// Seconds between refreshes (default: refresh_interval_secs from settings).
        #[arg(long)]
        interval: Option<u64>,

        /// Section rows by frequency.
        #[arg(long)]
        group: bool,
    },
}
