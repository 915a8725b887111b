//! Process liveness probing.
//!
//! The default probe shells out to `pgrep -f`, which matches the pattern as an
//! extended regex against every process's full command line.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::SnifferError;

/// Answers "is a process matching this pattern alive?".
///
/// Implementations never fail: any query error is reported as `false`.
#[async_trait]
pub trait ProcessProbe: Send + Sync {
    /// `None` or a blank pattern returns `false` without querying the OS.
    async fn is_running(&self, pattern: Option<&str>) -> bool;
}

/// `pgrep -f` backed probe.
#[derive(Debug, Clone)]
pub struct PgrepProbe {
    program: String,
}

impl Default for PgrepProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl PgrepProbe {
    /// Probe using `pgrep` from `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_program("pgrep")
    }

    /// Probe using a specific `pgrep`-compatible executable.
    #[must_use]
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Run the query and surface its failures.
    ///
    /// Exit status 0 means a match, 1 means no match, anything else is an error.
    pub async fn query(&self, pattern: &str) -> Result<bool, SnifferError> {
        let status = Command::new(&self.program)
            .args(["-f", "--", pattern])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|source| SnifferError::ProbeSpawn {
                program: self.program.clone(),
                source,
            })?;

        match status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            Some(code) => Err(SnifferError::ProbeExit(code)),
            None => Err(SnifferError::ProbeTerminated),
        }
    }
}

#[async_trait]
impl ProcessProbe for PgrepProbe {
    async fn is_running(&self, pattern: Option<&str>) -> bool {
        let Some(pattern) = pattern.filter(|p| !p.trim().is_empty()) else {
            return false;
        };
        match self.query(pattern).await {
            Ok(alive) => {
                tracing::debug!(pattern, alive, "process probe finished");
                alive
            }
            Err(error) => {
                tracing::warn!(pattern, %error, "process probe failed; assuming not running");
                false
            }
        }
    }
}
