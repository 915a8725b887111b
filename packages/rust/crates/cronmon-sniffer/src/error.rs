//! Error types for sniffer operations.
//!
//! Library crates use `thiserror` for explicit error enums.

use std::path::PathBuf;

use thiserror::Error;

/// Errors for job sniffing and job-list loading.
#[derive(Debug, Error)]
pub enum SnifferError {
    /// The process-table query could not be started (tool missing, permission denied).
    #[error("Failed to run process query `{program}`: {source}")]
    ProbeSpawn {
        /// Program that was invoked.
        program: String,
        /// Underlying spawn failure.
        #[source]
        source: std::io::Error,
    },

    /// The process-table query exited with an error status.
    #[error("Process query exited with status {0}")]
    ProbeExit(i32),

    /// The process-table query was terminated by a signal.
    #[error("Process query was terminated by a signal")]
    ProbeTerminated,

    /// The blocking glob scan task did not complete.
    #[error("Log scan task failed: {0}")]
    ScanTask(String),

    /// Cannot read the jobs file.
    #[error("Failed to read jobs file {path}: {source}")]
    JobsRead {
        /// Jobs file path.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The jobs file is not a valid jobs document.
    #[error("Failed to parse jobs file {path}: {source}")]
    JobsParse {
        /// Jobs file path (empty when parsed from a string).
        path: PathBuf,
        /// Underlying JSON failure.
        #[source]
        source: serde_json::Error,
    },
}
