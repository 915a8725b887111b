//! Monitor settings loader.
//!
//! Loads and merges:
//! - System defaults: `<PRJ_ROOT>/packages/conf/cronmon.yaml`
//! - User overrides:  `<config home>/settings.yaml`
//!
//! Merge precedence is user over system. The config home is `--conf`, else
//! `$CRONMON_CONFIG_HOME`, else the platform config directory + `cronmon`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use cronmon_sniffer::{BatchOptions, jobs_file_in};

const DEFAULT_SYSTEM_SETTINGS_RELATIVE_PATH: &str = "packages/conf/cronmon.yaml";
const USER_SETTINGS_FILE_NAME: &str = "settings.yaml";
const CONFIG_HOME_ENV: &str = "CRONMON_CONFIG_HOME";
const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 60;
const DEFAULT_JOB_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MAX_CONCURRENT: usize = 8;
const DEFAULT_PAGER: &str = "less +G";

/// Raw settings as written in YAML; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MonitorSettings {
    /// Jobs file; relative paths are resolved against the config home.
    pub jobs_file: Option<PathBuf>,
    /// Seconds between refreshes in `watch`.
    pub refresh_interval_secs: Option<u64>,
    /// Per-job evaluation deadline in seconds.
    pub job_timeout_secs: Option<u64>,
    /// Jobs evaluated at once.
    pub max_concurrent: Option<usize>,
    /// Pager command line used by `log`.
    pub pager: Option<String>,
}

impl MonitorSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            jobs_file: overlay.jobs_file.or(self.jobs_file),
            refresh_interval_secs: overlay.refresh_interval_secs.or(self.refresh_interval_secs),
            job_timeout_secs: overlay.job_timeout_secs.or(self.job_timeout_secs),
            max_concurrent: overlay.max_concurrent.or(self.max_concurrent),
            pager: overlay.pager.or(self.pager),
        }
    }

    /// Apply defaults and produce the effective configuration.
    #[must_use]
    pub fn resolve(self, config_home: &Path) -> MonitorConfig {
        let jobs_file = self.jobs_file.map_or_else(
            || jobs_file_in(config_home),
            |path| absolutize(config_home, path),
        );
        let pager = self
            .pager
            .as_deref()
            .map(split_command)
            .filter(|argv| !argv.is_empty())
            .unwrap_or_else(|| split_command(DEFAULT_PAGER));

        MonitorConfig {
            jobs_file,
            refresh_interval: Duration::from_secs(
                self.refresh_interval_secs
                    .unwrap_or(DEFAULT_REFRESH_INTERVAL_SECS)
                    .max(1),
            ),
            batch: BatchOptions {
                max_concurrent: self.max_concurrent.unwrap_or(DEFAULT_MAX_CONCURRENT).max(1),
                job_timeout: Duration::from_secs(
                    self.job_timeout_secs.unwrap_or(DEFAULT_JOB_TIMEOUT_SECS).max(1),
                ),
            },
            pager,
        }
    }
}

/// Effective configuration after defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Jobs file to load.
    pub jobs_file: PathBuf,
    /// Refresh period for `watch`.
    pub refresh_interval: Duration,
    /// Concurrency and per-job deadline.
    pub batch: BatchOptions,
    /// Pager argv; the log path is appended.
    pub pager: Vec<String>,
}

/// Load merged settings (user overrides system).
#[must_use]
pub fn load_settings(config_home: &Path) -> MonitorSettings {
    let system_path = project_root().join(DEFAULT_SYSTEM_SETTINGS_RELATIVE_PATH);
    let user_path = config_home.join(USER_SETTINGS_FILE_NAME);
    load_settings_from_paths(&system_path, &user_path)
}

#[doc(hidden)]
#[must_use]
pub fn load_settings_from_paths(system: &Path, user: &Path) -> MonitorSettings {
    load_one(system).merge(load_one(user))
}

fn load_one(path: &Path) -> MonitorSettings {
    if !path.exists() {
        return MonitorSettings::default();
    }
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) => {
            tracing::warn!(
                path = %path.display(),
                error = %error,
                "failed to read settings file; ignoring"
            );
            return MonitorSettings::default();
        }
    };
    if raw.trim().is_empty() {
        return MonitorSettings::default();
    }
    match serde_yaml::from_str::<MonitorSettings>(&raw) {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(
                path = %path.display(),
                error = %error,
                "failed to parse settings yaml; ignoring file"
            );
            MonitorSettings::default()
        }
    }
}

/// Resolve the config home: explicit override, then `$CRONMON_CONFIG_HOME`,
/// then `<platform config dir>/cronmon`.
#[must_use]
pub fn resolve_config_home(override_dir: Option<&Path>) -> PathBuf {
    if let Some(path) = override_dir.filter(|p| !p.as_os_str().is_empty()) {
        return absolutize(&current_dir(), path.to_path_buf());
    }
    let configured = std::env::var(CONFIG_HOME_ENV)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    if let Some(configured) = configured {
        return absolutize(&current_dir(), PathBuf::from(configured));
    }
    dirs::config_dir().map_or_else(
        || current_dir().join(".config").join("cronmon"),
        |dir| dir.join("cronmon"),
    )
}

fn project_root() -> PathBuf {
    std::env::var("PRJ_ROOT")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map_or_else(current_dir, PathBuf::from)
}

fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn absolutize(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

fn split_command(command: &str) -> Vec<String> {
    command.split_whitespace().map(str::to_string).collect()
}
