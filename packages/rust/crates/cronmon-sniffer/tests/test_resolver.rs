//! Tests for job state resolution: decision order, batch ordering and deadlines.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone};
use tempfile::TempDir;

use cronmon_sniffer::{
    BatchOptions, Frequency, GlobLocator, Job, JobStateResolver, JobStatus, LogFile, LogLocator,
    PgrepProbe, ProcessProbe, SnifferError,
};

// ----------------------------------------------------------------------------
// Doubles
// ----------------------------------------------------------------------------

struct FixedProbe {
    alive: bool,
    calls: AtomicUsize,
}

impl FixedProbe {
    fn new(alive: bool) -> Arc<Self> {
        Arc::new(Self {
            alive,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ProcessProbe for FixedProbe {
    async fn is_running(&self, _pattern: Option<&str>) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.alive
    }
}

enum Lookup {
    Found(LogFile),
    Nothing,
    Broken,
    Hang,
}

struct StubLocator {
    by_pattern: HashMap<String, Lookup>,
}

impl StubLocator {
    fn new(entries: Vec<(&str, Lookup)>) -> Arc<Self> {
        Arc::new(Self {
            by_pattern: entries
                .into_iter()
                .map(|(pattern, lookup)| (pattern.to_string(), lookup))
                .collect(),
        })
    }
}

#[async_trait]
impl LogLocator for StubLocator {
    async fn latest(&self, pattern: &str) -> Result<Option<LogFile>, SnifferError> {
        match self.by_pattern.get(pattern) {
            Some(Lookup::Found(file)) => Ok(Some(file.clone())),
            Some(Lookup::Nothing) | None => Ok(None),
            Some(Lookup::Broken) => Err(SnifferError::ScanTask("scan panicked".to_string())),
            Some(Lookup::Hang) => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(None)
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Helpers
// ----------------------------------------------------------------------------

fn local(y: i32, m: u32, d: u32, h: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

fn job(name: &str, frequency: Frequency, log_pattern: &str, process: Option<&str>) -> Job {
    Job::new(name, frequency, log_pattern, process.map(str::to_string))
}

fn write_log(path: &Path, content: &str, modified: DateTime<Local>) {
    fs::write(path, content).unwrap();
    let file = fs::File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::from(modified)).unwrap();
}

fn found(path: PathBuf, modified: DateTime<Local>) -> Lookup {
    Lookup::Found(LogFile { path, modified })
}

// ----------------------------------------------------------------------------
// Single-job decisions
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_running_wins_over_failed_log() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("backup.log");
    let modified = local(2026, 2, 1, 8);
    write_log(&path, "[JOB STARTED]\n[JOB FAILED]\n", modified);

    let resolver = JobStateResolver::new(
        FixedProbe::new(true),
        StubLocator::new(vec![("backup-*.log", found(path.clone(), modified))]),
    );
    let state = resolver
        .resolve_at(
            &job("Backup", Frequency::Daily, "backup-*.log", Some("backup.sh")),
            local(2026, 2, 1, 9),
        )
        .await;

    assert_eq!(state.status(), JobStatus::Running);
    assert_eq!(state.message(), "Process active");
    assert_eq!(state.file(), Some(path.as_path()));
    assert!(state.last_modification_time().is_none());
}

#[tokio::test]
async fn test_running_without_logs() {
    let resolver = JobStateResolver::new(FixedProbe::new(true), StubLocator::new(vec![]));
    let state = resolver
        .resolve_at(
            &job("Backup", Frequency::Daily, "backup-*.log", Some("backup.sh")),
            local(2026, 2, 1, 9),
        )
        .await;

    assert_eq!(state.status(), JobStatus::Running);
    assert!(state.file().is_none());
}

#[tokio::test]
async fn test_running_with_broken_lookup_still_running() {
    let resolver = JobStateResolver::new(
        FixedProbe::new(true),
        StubLocator::new(vec![("backup-*.log", Lookup::Broken)]),
    );
    let state = resolver
        .resolve_at(
            &job("Backup", Frequency::Daily, "backup-*.log", Some("backup.sh")),
            local(2026, 2, 1, 9),
        )
        .await;
    assert_eq!(state.status(), JobStatus::Running);
}

#[tokio::test]
async fn test_no_logs_is_missing() {
    let resolver = JobStateResolver::new(
        FixedProbe::new(false),
        StubLocator::new(vec![("report-*.log", Lookup::Nothing)]),
    );
    let state = resolver
        .resolve_at(
            &job("Report", Frequency::Weekly, "report-*.log", Some("report")),
            local(2026, 2, 1, 9),
        )
        .await;

    assert_eq!(state.status(), JobStatus::Missing);
    assert_eq!(state.message(), "No logs found");
    assert!(state.file().is_none());
    assert!(state.last_modification_time().is_none());
}

#[tokio::test]
async fn test_empty_process_pattern_and_no_logs_never_queries() {
    // `true` always reports a match, so any real query would yield RUNNING.
    let dir = TempDir::new().unwrap();
    let resolver = JobStateResolver::new(
        Arc::new(PgrepProbe::with_program("true")),
        Arc::new(GlobLocator::new()),
    );
    let pattern = format!("{}/cleanup-*.log", dir.path().display());

    let state = resolver
        .resolve_at(
            &job("Cleanup", Frequency::Monthly, &pattern, Some("")),
            local(2026, 2, 1, 9),
        )
        .await;

    assert_eq!(state.status(), JobStatus::Missing);
    assert!(state.file().is_none());
}

#[tokio::test]
async fn test_successful_run_today_is_success() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("backup-2026-02-01.log");
    let modified = local(2026, 2, 1, 3);
    write_log(&path, "[JOB STARTED]\n...\n[JOB SUCCEEDED]\n", modified);

    let resolver = JobStateResolver::new(FixedProbe::new(false), Arc::new(GlobLocator::new()));
    let pattern = format!("{}/backup-*.log", dir.path().display());
    let state = resolver
        .resolve_at(
            &job("Backup", Frequency::Daily, &pattern, Some("backup.sh")),
            local(2026, 2, 1, 18),
        )
        .await;

    assert_eq!(state.status(), JobStatus::Success);
    assert_eq!(state.message(), "Finished");
    assert_eq!(state.file(), Some(path.as_path()));
    assert_eq!(state.last_modification_time(), Some(modified));
}

#[tokio::test]
async fn test_successful_run_yesterday_is_stale() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("backup-2026-01-31.log");
    let modified = local(2026, 1, 31, 3);
    write_log(&path, "[JOB STARTED]\n[JOB SUCCEEDED]\n", modified);

    let resolver = JobStateResolver::new(FixedProbe::new(false), Arc::new(GlobLocator::new()));
    let pattern = format!("{}/backup-*.log", dir.path().display());
    let state = resolver
        .resolve_at(
            &job("Backup", Frequency::Daily, &pattern, None),
            local(2026, 2, 1, 9),
        )
        .await;

    assert_eq!(state.status(), JobStatus::Stale);
    assert_eq!(state.message(), "Pending");
    assert_eq!(state.file(), Some(path.as_path()));
    assert_eq!(state.last_modification_time(), Some(modified));
}

#[tokio::test]
async fn test_stale_failure_is_still_stale() {
    let modified = local(2026, 1, 15, 3);
    let resolver = JobStateResolver::new(
        FixedProbe::new(false),
        StubLocator::new(vec![(
            "cleanup-*.log",
            // Content is never read for stale logs, so the file need not exist.
            found(PathBuf::from("/nonexistent/cleanup-1.log"), modified),
        )]),
    );
    let state = resolver
        .resolve_at(
            &job("Cleanup", Frequency::Monthly, "cleanup-*.log", None),
            local(2026, 2, 1, 9),
        )
        .await;
    assert_eq!(state.status(), JobStatus::Stale);
}

#[tokio::test]
async fn test_weekly_run_earlier_in_week_is_fresh() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.log");
    // Monday 2026-02-02 and Sunday 2026-02-08 share ISO week 6.
    let modified = local(2026, 2, 2, 6);
    write_log(&path, "[JOB STARTED]\n", modified);

    let resolver = JobStateResolver::new(
        FixedProbe::new(false),
        StubLocator::new(vec![("report.log", found(path.clone(), modified))]),
    );
    let state = resolver
        .resolve_at(
            &job("Report", Frequency::Weekly, "report.log", Some("generate_report")),
            local(2026, 2, 8, 20),
        )
        .await;

    assert_eq!(state.status(), JobStatus::Crashed);
    assert_eq!(state.message(), "Crashed");
}

#[tokio::test]
async fn test_fresh_log_without_markers_is_unknown() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sync.log");
    let modified = local(2026, 2, 1, 6);
    write_log(&path, "synced 42 files\n", modified);

    let resolver = JobStateResolver::new(
        FixedProbe::new(false),
        StubLocator::new(vec![("sync.log", found(path, modified))]),
    );
    let state = resolver
        .resolve_at(
            &job("Sync", Frequency::Daily, "sync.log", None),
            local(2026, 2, 1, 7),
        )
        .await;
    assert_eq!(state.status(), JobStatus::Unknown);
    assert_eq!(state.last_modification_time(), Some(modified));
}

#[tokio::test]
async fn test_vanished_log_is_error_with_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gone.log");
    let modified = local(2026, 2, 1, 6);

    let resolver = JobStateResolver::new(
        FixedProbe::new(false),
        StubLocator::new(vec![("gone.log", found(path.clone(), modified))]),
    );
    let state = resolver
        .resolve_at(
            &job("Gone", Frequency::Daily, "gone.log", None),
            local(2026, 2, 1, 7),
        )
        .await;

    assert_eq!(state.status(), JobStatus::Error);
    assert_eq!(state.file(), Some(path.as_path()));
    assert!(state.last_modification_time().is_none());
}

#[tokio::test]
async fn test_lookup_failure_is_error() {
    let resolver = JobStateResolver::new(
        FixedProbe::new(false),
        StubLocator::new(vec![("broken-*.log", Lookup::Broken)]),
    );
    let state = resolver
        .resolve_at(
            &job("Broken", Frequency::Daily, "broken-*.log", None),
            local(2026, 2, 1, 7),
        )
        .await;

    assert_eq!(state.status(), JobStatus::Error);
    assert!(state.message().contains("scan panicked"));
    assert!(state.file().is_none());
}

#[tokio::test]
async fn test_each_call_reflects_current_files() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("backup.log");
    let modified = local(2026, 2, 1, 3);
    write_log(&path, "[JOB STARTED]\n", modified);

    let resolver = JobStateResolver::new(FixedProbe::new(false), Arc::new(GlobLocator::new()));
    let backup = job(
        "Backup",
        Frequency::Daily,
        &format!("{}/backup.log", dir.path().display()),
        None,
    );
    let now = local(2026, 2, 1, 12);

    assert_eq!(
        resolver.resolve_at(&backup, now).await.status(),
        JobStatus::Crashed
    );

    write_log(&path, "[JOB STARTED]\n[JOB SUCCEEDED]\n", modified);
    assert_eq!(
        resolver.resolve_at(&backup, now).await.status(),
        JobStatus::Success
    );
}

// ----------------------------------------------------------------------------
// Batches
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_batch_preserves_order_and_isolates_timeouts() {
    let modified = local(2026, 2, 1, 3);
    let resolver = JobStateResolver::new(
        FixedProbe::new(false),
        StubLocator::new(vec![
            ("a.log", Lookup::Nothing),
            ("b.log", Lookup::Hang),
            ("c.log", found(PathBuf::from("/nonexistent/c.log"), modified)),
            ("d.log", Lookup::Broken),
        ]),
    );
    let jobs = vec![
        job("A", Frequency::Daily, "a.log", None),
        job("B", Frequency::Daily, "b.log", None),
        job("C", Frequency::Weekly, "c.log", None),
        job("D", Frequency::Daily, "d.log", None),
    ];
    let options = BatchOptions {
        max_concurrent: 4,
        job_timeout: Duration::from_millis(100),
    };

    let states = resolver
        .resolve_all_at(&jobs, local(2026, 3, 1, 9), &options)
        .await;

    let statuses: Vec<JobStatus> = states.iter().map(|s| s.status()).collect();
    assert_eq!(
        statuses,
        vec![
            JobStatus::Missing,
            JobStatus::Error,
            JobStatus::Stale,
            JobStatus::Error,
        ]
    );
    assert_eq!(states[1].message(), "Timed out after 100ms");
    assert!(states[1].file().is_none());
}

#[tokio::test]
async fn test_batch_with_single_worker_is_ordered() {
    let resolver = JobStateResolver::new(
        FixedProbe::new(true),
        StubLocator::new(vec![("x.log", Lookup::Nothing)]),
    );
    let jobs: Vec<Job> = (0..5)
        .map(|i| job(&format!("job-{i}"), Frequency::Daily, "x.log", Some("x")))
        .collect();
    let options = BatchOptions {
        max_concurrent: 0,
        ..BatchOptions::default()
    };

    let states = resolver.resolve_all(&jobs, &options).await;
    assert_eq!(states.len(), 5);
    assert!(states.iter().all(|s| s.status() == JobStatus::Running));
}

#[tokio::test]
async fn test_empty_batch() {
    let resolver = JobStateResolver::new(FixedProbe::new(false), StubLocator::new(vec![]));
    let states = resolver.resolve_all(&[], &BatchOptions::default()).await;
    assert!(states.is_empty());
}

#[tokio::test]
async fn test_probe_consulted_once_per_job() {
    let probe = FixedProbe::new(false);
    let resolver = JobStateResolver::new(probe.clone(), StubLocator::new(vec![]));
    let jobs = vec![
        job("A", Frequency::Daily, "a.log", Some("a")),
        job("B", Frequency::Daily, "b.log", Some("b")),
    ];

    resolver.resolve_all(&jobs, &BatchOptions::default()).await;
    assert_eq!(probe.calls.load(Ordering::SeqCst), 2);
}
