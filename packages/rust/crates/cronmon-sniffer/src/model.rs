//! Job definitions and the per-evaluation state snapshot.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Recurrence period of a job. The set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Runs once per calendar day.
    Daily,
    /// Runs once per ISO week.
    Weekly,
    /// Runs once per calendar month.
    Monthly,
}

impl Frequency {
    /// Lowercase tag as written in the jobs file.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a frequency tag is not one of `daily`, `weekly`, `monthly`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFrequency(pub String);

impl fmt::Display for UnknownFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown frequency `{}`", self.0)
    }
}

impl std::error::Error for UnknownFrequency {}

impl FromStr for Frequency {
    type Err = UnknownFrequency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(UnknownFrequency(other.to_string())),
        }
    }
}

/// A monitored job, as loaded from the jobs file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    /// Display name.
    pub name: String,
    /// Expected recurrence.
    pub frequency: Frequency,
    /// Glob for the job's log files; may start with `~`.
    pub log_pattern: String,
    /// Full-command-line pattern for the liveness check. `None` disables the check.
    pub process_pattern: Option<String>,
}

impl Job {
    /// Create a job. A blank `process_pattern` is stored as `None`.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        frequency: Frequency,
        log_pattern: impl Into<String>,
        process_pattern: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            frequency,
            log_pattern: log_pattern.into(),
            process_pattern: process_pattern.filter(|p| !p.trim().is_empty()),
        }
    }
}

/// Classification label for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobStatus {
    /// A matching process is alive.
    Running,
    /// No log file matched the pattern.
    Missing,
    /// The latest log falls outside the current frequency window.
    Stale,
    /// The latest log carries the success marker.
    Success,
    /// The latest log carries the failure marker.
    Failed,
    /// The latest log was started but never finished.
    Crashed,
    /// The latest log carries none of the markers.
    Unknown,
    /// The evaluation itself failed.
    Error,
}

/// Severity bucket of a status, used for colouring and the overall health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Running or succeeded.
    Ok,
    /// Stale, missing or unknown.
    Warn,
    /// Failed, crashed or errored.
    Fail,
}

impl JobStatus {
    /// All eight labels.
    pub const ALL: [Self; 8] = [
        Self::Running,
        Self::Missing,
        Self::Stale,
        Self::Success,
        Self::Failed,
        Self::Crashed,
        Self::Unknown,
        Self::Error,
    ];

    /// Uppercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Running => "RUNNING",
            Self::Missing => "MISSING",
            Self::Stale => "STALE",
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
            Self::Crashed => "CRASHED",
            Self::Unknown => "UNKNOWN",
            Self::Error => "ERROR",
        }
    }

    /// Severity bucket.
    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            Self::Running | Self::Success => Severity::Ok,
            Self::Stale | Self::Missing | Self::Unknown => Severity::Warn,
            Self::Failed | Self::Crashed | Self::Error => Severity::Fail,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of evaluating one job. Built fresh on every evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobState {
    status: JobStatus,
    message: String,
    file: Option<PathBuf>,
    last_modification_time: Option<DateTime<Local>>,
}

impl JobState {
    /// A matching process is alive; `file` is informational only.
    #[must_use]
    pub fn running(file: Option<PathBuf>) -> Self {
        Self {
            status: JobStatus::Running,
            message: "Process active".to_string(),
            file,
            last_modification_time: None,
        }
    }

    /// No log file matched.
    #[must_use]
    pub fn missing() -> Self {
        Self {
            status: JobStatus::Missing,
            message: "No logs found".to_string(),
            file: None,
            last_modification_time: None,
        }
    }

    /// The latest log is outside the current window.
    #[must_use]
    pub fn stale(file: PathBuf, modified: DateTime<Local>) -> Self {
        Self {
            status: JobStatus::Stale,
            message: "Pending".to_string(),
            file: Some(file),
            last_modification_time: Some(modified),
        }
    }

    /// Evaluation failed. No timestamp is ever attached.
    #[must_use]
    pub fn error(file: Option<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Error,
            message: message.into(),
            file,
            last_modification_time: None,
        }
    }

    /// Outcome read from a fresh log's markers.
    pub(crate) fn from_log(
        status: JobStatus,
        message: &str,
        file: PathBuf,
        modified: DateTime<Local>,
    ) -> Self {
        Self {
            status,
            message: message.to_string(),
            file: Some(file),
            last_modification_time: Some(modified),
        }
    }

    /// Classification label.
    #[must_use]
    pub fn status(&self) -> JobStatus {
        self.status
    }

    /// Short human-readable phrase.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Log file examined, if any.
    #[must_use]
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Modification time of the log, when it took part in the decision.
    #[must_use]
    pub fn last_modification_time(&self) -> Option<DateTime<Local>> {
        self.last_modification_time
    }
}

/// Worst-status summary over a batch of states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverallHealth {
    /// Every job is running or succeeded.
    Healthy,
    /// At least one job is stale, missing or unknown, and none failed.
    Warning,
    /// At least one job failed, crashed or errored.
    Failing,
}

impl OverallHealth {
    /// Summarise a batch. An empty batch is healthy.
    #[must_use]
    pub fn from_states<'a>(states: impl IntoIterator<Item = &'a JobState>) -> Self {
        let worst = states
            .into_iter()
            .map(|state| state.status().severity())
            .max()
            .unwrap_or(Severity::Ok);
        match worst {
            Severity::Ok => Self::Healthy,
            Severity::Warn => Self::Warning,
            Severity::Fail => Self::Failing,
        }
    }

    /// One-line description.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Healthy => "All systems operational",
            Self::Warning => "Warnings present",
            Self::Failing => "Job failure detected",
        }
    }
}
