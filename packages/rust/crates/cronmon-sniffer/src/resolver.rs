//! Job state resolution.
//!
//! ```text
//! probe(process_pattern) ── alive ──→ RUNNING (latest log attached, no timestamp)
//!        │ not alive
//!        ↓
//! locate(log_pattern) ──── none ───→ MISSING
//!        │ latest
//!        ↓
//! window(mtime, frequency, now) ─ outside ─→ STALE "Pending"
//!        │ inside
//!        ↓
//! classify(content) → FAILED | SUCCESS | CRASHED | UNKNOWN | ERROR
//! ```
//!
//! Every call recomputes from the current process table and filesystem.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use futures::stream::{self, StreamExt};

use crate::classify::analyze_log_file;
use crate::locator::{GlobLocator, LogLocator};
use crate::model::{Job, JobState};
use crate::probe::{PgrepProbe, ProcessProbe};
use crate::window::is_within_window;

/// Limits for evaluating a batch of jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Maximum jobs evaluated at once (at least 1).
    pub max_concurrent: usize,
    /// Deadline per job; an expired job reports `ERROR`.
    pub job_timeout: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_concurrent: 8,
            job_timeout: Duration::from_secs(10),
        }
    }
}

/// Combines liveness, log discovery, the frequency window and log markers
/// into one [`JobState`] per job.
#[derive(Clone)]
pub struct JobStateResolver {
    probe: Arc<dyn ProcessProbe>,
    locator: Arc<dyn LogLocator>,
}

impl Default for JobStateResolver {
    fn default() -> Self {
        Self::new(Arc::new(PgrepProbe::new()), Arc::new(GlobLocator::new()))
    }
}

impl JobStateResolver {
    /// Resolver with explicit collaborators.
    #[must_use]
    pub fn new(probe: Arc<dyn ProcessProbe>, locator: Arc<dyn LogLocator>) -> Self {
        Self { probe, locator }
    }

    /// Resolve one job against the wall clock.
    pub async fn resolve(&self, job: &Job) -> JobState {
        self.resolve_at(job, Local::now()).await
    }

    /// Resolve one job with an explicit "now".
    pub async fn resolve_at(&self, job: &Job, now: DateTime<Local>) -> JobState {
        if self.probe.is_running(job.process_pattern.as_deref()).await {
            let file = match self.locator.latest(&job.log_pattern).await {
                Ok(latest) => latest.map(|f| f.path),
                Err(error) => {
                    tracing::debug!(job = %job.name, %error, "log lookup failed for running job");
                    None
                }
            };
            return JobState::running(file);
        }

        let latest = match self.locator.latest(&job.log_pattern).await {
            Ok(Some(latest)) => latest,
            Ok(None) => return JobState::missing(),
            Err(error) => return JobState::error(None, error.to_string()),
        };

        if !is_within_window(&latest.modified, job.frequency, &now) {
            return JobState::stale(latest.path, latest.modified);
        }

        analyze_log_file(&latest.path, latest.modified).await
    }

    /// Resolve every job against the wall clock. See [`Self::resolve_all_at`].
    pub async fn resolve_all(&self, jobs: &[Job], options: &BatchOptions) -> Vec<JobState> {
        self.resolve_all_at(jobs, Local::now(), options).await
    }

    /// Resolve every job concurrently; the output is positionally aligned with `jobs`.
    ///
    /// A job exceeding `options.job_timeout` yields an `ERROR` state without
    /// affecting the others.
    pub async fn resolve_all_at(
        &self,
        jobs: &[Job],
        now: DateTime<Local>,
        options: &BatchOptions,
    ) -> Vec<JobState> {
        let timeout = options.job_timeout;
        stream::iter(jobs)
            .map(|job| async move {
                match tokio::time::timeout(timeout, self.resolve_at(job, now)).await {
                    Ok(state) => state,
                    Err(_) => {
                        tracing::warn!(
                            job = %job.name,
                            timeout_secs = timeout.as_secs_f64(),
                            "job evaluation timed out"
                        );
                        JobState::error(None, format!("Timed out after {timeout:?}"))
                    }
                }
            })
            .buffered(options.max_concurrent.max(1))
            .collect()
            .await
    }
}
