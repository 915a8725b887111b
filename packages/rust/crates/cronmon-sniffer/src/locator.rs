//! Latest-log discovery.
//!
//! A pattern is split into its literal directory prefix and a glob tail:
//!
//! ```text
//! ~/logs/backup/*/run-*.log
//!      ↓ expand_home
//! /home/me/logs/backup/*/run-*.log
//!      ↓ split
//! base = /home/me/logs/backup   tail = */run-*.log (depth 2)
//!      ↓
//! WalkDir(base, max_depth) + GlobMatcher(tail) → newest mtime
//! ```
//!
//! `*` and `?` never cross `/`; `**` spans directories. Wildcards skip
//! dot-files unless the segment itself starts with `.`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Local};
use globset::{GlobBuilder, GlobMatcher};
use walkdir::WalkDir;

use crate::error::SnifferError;

/// A matched log file and its modification time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    /// Path as produced by the pattern expansion.
    pub path: PathBuf,
    /// Filesystem modification time.
    pub modified: DateTime<Local>,
}

/// Finds the most recently modified entry matching a pattern.
#[async_trait]
pub trait LogLocator: Send + Sync {
    /// `Ok(None)` when nothing matches. Ties on mtime may return any of the tied entries.
    async fn latest(&self, pattern: &str) -> Result<Option<LogFile>, SnifferError>;
}

/// Filesystem locator built on `globset` + `walkdir`.
#[derive(Debug, Clone)]
pub struct GlobLocator {
    home: Option<PathBuf>,
}

impl Default for GlobLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl GlobLocator {
    /// Locator expanding `~` to the current user's home directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            home: dirs::home_dir(),
        }
    }

    /// Locator expanding `~` to `home`.
    #[must_use]
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self {
            home: Some(home.into()),
        }
    }

    /// Synchronous lookup; walks the filesystem on the calling thread.
    #[must_use]
    pub fn find_latest(&self, pattern: &str) -> Option<LogFile> {
        let expanded = expand_home(pattern, self.home.as_deref());
        let latest = matching_entries(&expanded)
            .into_iter()
            .filter_map(|path| {
                let modified = std::fs::metadata(&path).and_then(|m| m.modified()).ok()?;
                Some(LogFile {
                    path,
                    modified: DateTime::<Local>::from(modified),
                })
            })
            .max_by_key(|file| file.modified);
        tracing::debug!(
            pattern = %expanded,
            found = ?latest.as_ref().map(|f| f.path.display().to_string()),
            "log lookup finished"
        );
        latest
    }
}

#[async_trait]
impl LogLocator for GlobLocator {
    async fn latest(&self, pattern: &str) -> Result<Option<LogFile>, SnifferError> {
        let locator = self.clone();
        let pattern = pattern.to_string();
        tokio::task::spawn_blocking(move || locator.find_latest(&pattern))
            .await
            .map_err(|e| SnifferError::ScanTask(e.to_string()))
    }
}

/// Replace a leading `~` (alone or followed by `/`) with `home`.
///
/// Other patterns, and every pattern when `home` is unknown, are returned unchanged.
#[must_use]
pub fn expand_home(pattern: &str, home: Option<&Path>) -> String {
    let Some(home) = home else {
        return pattern.to_string();
    };
    if pattern == "~" {
        return home.to_string_lossy().into_owned();
    }
    match pattern.strip_prefix("~/") {
        Some(rest) => home.join(rest).to_string_lossy().into_owned(),
        None => pattern.to_string(),
    }
}

/// All existing paths matching an already home-expanded pattern.
fn matching_entries(pattern: &str) -> Vec<PathBuf> {
    let (base, tail) = split_literal_prefix(pattern);
    let Some(tail) = tail else {
        return literal_match(&base);
    };

    let matcher = match compile(&tail) {
        Ok(matcher) => matcher,
        Err(error) => {
            // Unbalanced classes and the like match nothing but themselves.
            tracing::debug!(pattern, %error, "invalid glob; matching literally");
            return literal_match(Path::new(pattern));
        }
    };

    let root = if base.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        base.clone()
    };
    let mut walker = WalkDir::new(&root).min_depth(1).follow_links(true);
    if !tail.contains("**") {
        walker = walker.max_depth(tail.split('/').count());
    }

    walker
        .into_iter()
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let relative = entry.path().strip_prefix(&root).ok()?;
            if !matcher.is_match(relative) || !hidden_components_allowed(relative, &tail) {
                return None;
            }
            Some(if base.as_os_str().is_empty() {
                relative.to_path_buf()
            } else {
                entry.path().to_path_buf()
            })
        })
        .collect()
}

/// A wildcard never matches a leading dot: a hidden component is only
/// accepted where its glob segment itself starts with `.`.
fn hidden_components_allowed(relative: &Path, tail: &str) -> bool {
    let segments: Vec<&str> = tail.split('/').collect();
    let recursive = tail.contains("**");
    let last = relative.components().count().saturating_sub(1);
    relative.components().enumerate().all(|(index, component)| {
        if !component.as_os_str().as_encoded_bytes().starts_with(b".") {
            return true;
        }
        // Under `**` only the final component lines up with a known segment.
        let segment = if !recursive {
            segments.get(index).copied()
        } else if index == last {
            segments.last().copied()
        } else {
            None
        };
        segment.is_some_and(|s| s.starts_with('.'))
    })
}

fn literal_match(path: &Path) -> Vec<PathBuf> {
    if path.as_os_str().is_empty() || std::fs::symlink_metadata(path).is_err() {
        Vec::new()
    } else {
        vec![path.to_path_buf()]
    }
}

fn compile(tail: &str) -> Result<GlobMatcher, globset::Error> {
    Ok(GlobBuilder::new(tail)
        .literal_separator(true)
        .build()?
        .compile_matcher())
}

fn has_glob_meta(segment: &str) -> bool {
    segment.contains(['*', '?', '[', '{'])
}

/// Split into (literal directory prefix, glob tail). The tail is `None` for a
/// pattern without wildcards.
fn split_literal_prefix(pattern: &str) -> (PathBuf, Option<String>) {
    let mut base = if pattern.starts_with('/') {
        PathBuf::from("/")
    } else {
        PathBuf::new()
    };
    let mut segments = pattern.split('/').filter(|s| !s.is_empty()).peekable();
    while let Some(segment) = segments.peek() {
        if has_glob_meta(segment) {
            break;
        }
        base.push(segment);
        segments.next();
    }
    let tail: Vec<&str> = segments.collect();
    if tail.is_empty() {
        (base, None)
    } else {
        (base, Some(tail.join("/")))
    }
}
