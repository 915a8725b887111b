//! Periodic refresh loop behind `cronmon watch`.

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use tokio::time::MissedTickBehavior;

use cronmon_sniffer::{BatchOptions, Job, JobState, JobStateResolver};

/// How a watch loop ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchOutcome {
    /// Completed batches handed to the refresh callback.
    pub refreshes: u64,
    /// A batch was in flight when shutdown fired and was dropped.
    pub discarded_in_flight: bool,
}

/// Evaluate `jobs` every `interval` and pass each completed batch to
/// `on_refresh`, until `shutdown` resolves.
///
/// `shutdown` is one future for the whole loop, so a signal delivered while
/// `on_refresh` runs is seen at the next wait. A batch interrupted by
/// shutdown is never handed to `on_refresh`. Missed ticks are skipped.
///
/// # Errors
///
/// Returns the first error from `on_refresh`.
pub async fn watch_until<S, F>(
    resolver: &JobStateResolver,
    jobs: &[Job],
    options: &BatchOptions,
    interval: Duration,
    shutdown: S,
    mut on_refresh: F,
) -> Result<WatchOutcome>
where
    S: Future,
    F: FnMut(&[JobState]) -> Result<()>,
{
    tokio::pin!(shutdown);
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut outcome = WatchOutcome::default();
    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            _ = ticker.tick() => {}
        }

        let states = tokio::select! {
            biased;
            _ = &mut shutdown => {
                outcome.discarded_in_flight = true;
                break;
            }
            states = resolver.resolve_all(jobs, options) => states,
        };
        outcome.refreshes += 1;
        on_refresh(&states)?;
    }
    Ok(outcome)
}
