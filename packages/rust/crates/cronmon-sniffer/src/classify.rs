//! Log content classification by lifecycle markers.
//!
//! Priority is fixed: failure, then success, then start. Markers are literal
//! substrings anywhere in the file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::model::{JobState, JobStatus};

/// Written by a job when it fails.
pub const MARKER_FAILED: &str = "[JOB FAILED]";
/// Written by a job when it completes successfully.
pub const MARKER_SUCCESS: &str = "[JOB SUCCEEDED]";
/// Written by a job when it starts.
pub const MARKER_STARTED: &str = "[JOB STARTED]";

/// Classify already-read log text.
#[must_use]
pub fn classify_log_content(
    content: &str,
    file: PathBuf,
    modified: DateTime<Local>,
) -> JobState {
    let (status, message) = if content.contains(MARKER_FAILED) {
        (JobStatus::Failed, "Failed")
    } else if content.contains(MARKER_SUCCESS) {
        (JobStatus::Success, "Finished")
    } else if content.contains(MARKER_STARTED) {
        (JobStatus::Crashed, "Crashed")
    } else {
        (JobStatus::Unknown, "Unknown log format")
    };
    JobState::from_log(status, message, file, modified)
}

/// Read a log file and classify it.
///
/// Undecodable bytes become U+FFFD. A failed read yields an `ERROR` state
/// carrying the path and the I/O error text, with no timestamp.
pub async fn analyze_log_file(path: &Path, modified: DateTime<Local>) -> JobState {
    match read_lossy(path).await {
        Ok(content) => classify_log_content(&content, path.to_path_buf(), modified),
        Err(error) => {
            tracing::debug!(path = %path.display(), %error, "failed to read log file");
            JobState::error(Some(path.to_path_buf()), error.to_string())
        }
    }
}

async fn read_lossy(path: &Path) -> std::io::Result<String> {
    let bytes = tokio::fs::read(path).await?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(error) => String::from_utf8_lossy(error.as_bytes()).into_owned(),
    })
}
