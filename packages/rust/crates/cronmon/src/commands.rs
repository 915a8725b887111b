use std::io::{IsTerminal, Write};

use anyhow::{Context, Result, bail};
use chrono::Local;
use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
};

use cronmon::{MonitorConfig, RenderOptions, render_json, render_table, watch_until};
use cronmon_sniffer::{Job, JobState, JobStateResolver, load_jobs};

/// Evaluate every job once and print the table or JSON.
pub(crate) async fn run_status(config: &MonitorConfig, group: bool, json: bool) -> Result<()> {
    let jobs = load_configured_jobs(config)?;
    let resolver = JobStateResolver::default();
    let states = resolver.resolve_all(&jobs, &config.batch).await;

    let mut stdout = std::io::stdout();
    if json {
        let encoded = render_json(&jobs, &states).context("failed to encode job states")?;
        writeln!(stdout, "{encoded}")?;
    } else {
        let options = RenderOptions {
            color: stdout.is_terminal(),
            grouped: group,
        };
        write!(stdout, "{}", render_table(&jobs, &states, options))?;
    }
    stdout.flush()?;
    Ok(())
}

/// Open the newest log of job `number` (1-based) in the configured pager.
pub(crate) async fn run_log(config: &MonitorConfig, number: usize) -> Result<()> {
    let jobs = load_configured_jobs(config)?;
    let Some(job) = number.checked_sub(1).and_then(|index| jobs.get(index)) else {
        bail!(
            "job number {number} is out of range (expected 1-{})",
            jobs.len()
        );
    };

    let resolver = JobStateResolver::default();
    let state = resolver
        .resolve_all(std::slice::from_ref(job), &config.batch)
        .await
        .pop()
        .unwrap_or_else(JobState::missing);
    let Some(file) = state.file() else {
        bail!("no log file for job {number} ({}): {}", job.name, state.message());
    };

    let (program, args) = config
        .pager
        .split_first()
        .context("pager command is empty")?;
    eprintln!("{} [{}] {}", job.name, state.status(), file.display());
    let status = tokio::process::Command::new(program)
        .args(args)
        .arg(file)
        .status()
        .await
        .with_context(|| format!("failed to start pager `{program}`"))?;
    if !status.success() {
        tracing::warn!(pager = %program, status = %status, "pager exited with failure");
    }
    Ok(())
}

/// Redraw the table every refresh interval until Ctrl+C.
///
/// A refresh interrupted by Ctrl+C is dropped without drawing.
pub(crate) async fn run_watch(config: &MonitorConfig, group: bool) -> Result<()> {
    let jobs = load_configured_jobs(config)?;
    let resolver = JobStateResolver::default();
    let interactive = std::io::stdout().is_terminal();
    tracing::info!(
        jobs = jobs.len(),
        interval_secs = config.refresh_interval.as_secs(),
        "watch started"
    );

    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::warn!(%error, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };
    let outcome = watch_until(
        &resolver,
        &jobs,
        &config.batch,
        config.refresh_interval,
        ctrl_c,
        |states| draw(&jobs, states, group, interactive),
    )
    .await?;

    tracing::info!(
        refreshes = outcome.refreshes,
        discarded_in_flight = outcome.discarded_in_flight,
        "watch received Ctrl+C; stopping"
    );
    Ok(())
}

fn draw(jobs: &[Job], states: &[JobState], group: bool, interactive: bool) -> Result<()> {
    let mut stdout = std::io::stdout();
    if interactive {
        execute!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;
    }
    let options = RenderOptions {
        color: interactive,
        grouped: group,
    };
    write!(stdout, "{}", render_table(jobs, states, options))?;
    writeln!(
        stdout,
        "Last refresh: {} (Ctrl+C to exit)",
        Local::now().format("%H:%M:%S")
    )?;
    stdout.flush()?;
    Ok(())
}

fn load_configured_jobs(config: &MonitorConfig) -> Result<Vec<Job>> {
    let jobs = load_jobs(&config.jobs_file)
        .with_context(|| format!("failed to load jobs from {}", config.jobs_file.display()))?;
    tracing::debug!(count = jobs.len(), path = %config.jobs_file.display(), "jobs loaded");
    Ok(jobs)
}
