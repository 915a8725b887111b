//! Jobs file loader: `{ "jobs": [ { name, frequency, log_pattern, process_pattern } ] }`.
//!
//! Records are validated one by one; an invalid record is dropped with a
//! warning and the rest are kept in file order.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::SnifferError;
use crate::model::{Frequency, Job};

#[derive(Debug, Deserialize)]
struct JobsFile {
    #[serde(default)]
    jobs: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct JobRecord {
    name: Option<String>,
    frequency: Option<String>,
    log_pattern: Option<String>,
    process_pattern: Option<String>,
}

/// Load and validate jobs from a JSON file.
///
/// # Errors
///
/// Returns [`SnifferError::JobsRead`] if the file cannot be read and
/// [`SnifferError::JobsParse`] if it is not a jobs document.
pub fn load_jobs(path: &Path) -> Result<Vec<Job>, SnifferError> {
    let raw = std::fs::read_to_string(path).map_err(|source| SnifferError::JobsRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_jobs(&raw, path)
}

/// Parse and validate jobs from JSON text.
///
/// # Errors
///
/// Returns [`SnifferError::JobsParse`] if the text is not a jobs document.
pub fn load_jobs_from_str(raw: &str) -> Result<Vec<Job>, SnifferError> {
    parse_jobs(raw, Path::new(""))
}

fn parse_jobs(raw: &str, path: &Path) -> Result<Vec<Job>, SnifferError> {
    let file: JobsFile = serde_json::from_str(raw).map_err(|source| SnifferError::JobsParse {
        path: path.to_path_buf(),
        source,
    })?;

    let jobs: Vec<Job> = file
        .jobs
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match to_job(value) {
            Ok(job) => Some(job),
            Err(reason) => {
                tracing::warn!(
                    path = %path.display(),
                    index,
                    reason = %reason,
                    "discarding invalid job record"
                );
                None
            }
        })
        .collect();
    tracing::debug!(path = %path.display(), count = jobs.len(), "jobs loaded");
    Ok(jobs)
}

fn to_job(value: serde_json::Value) -> Result<Job, String> {
    let record: JobRecord = serde_json::from_value(value).map_err(|e| e.to_string())?;
    let name = non_blank(record.name).ok_or("missing name")?;
    let log_pattern = non_blank(record.log_pattern).ok_or("missing log_pattern")?;
    let frequency = record
        .frequency
        .ok_or("missing frequency")?
        .trim()
        .parse::<Frequency>()
        .map_err(|e| e.to_string())?;
    Ok(Job::new(name, frequency, log_pattern, record.process_pattern))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Group 0-based `(index, job)` pairs by frequency, in first-appearance order.
#[must_use]
pub fn group_by_frequency(jobs: &[Job]) -> Vec<(Frequency, Vec<(usize, &Job)>)> {
    let mut groups: Vec<(Frequency, Vec<(usize, &Job)>)> = Vec::new();
    for (index, job) in jobs.iter().enumerate() {
        match groups.iter_mut().find(|(f, _)| *f == job.frequency) {
            Some((_, members)) => members.push((index, job)),
            None => groups.push((job.frequency, vec![(index, job)])),
        }
    }
    groups
}

/// Default jobs file name inside a config directory.
pub const JOBS_FILE_NAME: &str = "jobs.json";

/// `<dir>/jobs.json`.
#[must_use]
pub fn jobs_file_in(dir: &Path) -> PathBuf {
    dir.join(JOBS_FILE_NAME)
}
