//! Health-state resolver for recurring scheduled jobs.
//!
//! Correlates three signals per job: a live process matching the job's
//! command line, the newest log file matching its glob, and whether that
//! log's mtime falls inside the job's recurrence window. Fresh logs are then
//! classified by `[JOB STARTED]` / `[JOB SUCCEEDED]` / `[JOB FAILED]` markers.
//!
//! # Architecture
//!
//! ```text
//! cronmon-sniffer/src/
//! ├── lib.rs       # Re-exports (this file)
//! ├── error.rs     # SnifferError enum
//! ├── model.rs     # Job, JobState, JobStatus, Frequency
//! ├── probe.rs     # ProcessProbe / PgrepProbe
//! ├── locator.rs   # LogLocator / GlobLocator (globset + walkdir)
//! ├── window.rs    # Frequency windows (day / ISO week / month)
//! ├── classify.rs  # Marker classification
//! ├── resolver.rs  # JobStateResolver (single job + ordered batch)
//! └── jobs.rs      # jobs.json loader
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use cronmon_sniffer::{BatchOptions, JobStateResolver, load_jobs};
//!
//! let jobs = load_jobs("jobs.json".as_ref())?;
//! let resolver = JobStateResolver::default();
//! let states = resolver.resolve_all(&jobs, &BatchOptions::default()).await;
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

mod classify;
mod error;
mod jobs;
mod locator;
mod model;
mod probe;
mod resolver;
mod window;

// ============================================================================
// Public Re-exports
// ============================================================================

pub use classify::{
    MARKER_FAILED, MARKER_STARTED, MARKER_SUCCESS, analyze_log_file, classify_log_content,
};
pub use error::SnifferError;
pub use jobs::{JOBS_FILE_NAME, group_by_frequency, jobs_file_in, load_jobs, load_jobs_from_str};
pub use locator::{GlobLocator, LogFile, LogLocator, expand_home};
pub use model::{Frequency, Job, JobState, JobStatus, OverallHealth, Severity, UnknownFrequency};
pub use probe::{PgrepProbe, ProcessProbe};
pub use resolver::{BatchOptions, JobStateResolver};
pub use window::{is_within_current_window, is_within_window, is_within_window_for_tag};
