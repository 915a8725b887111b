//! Frequency windows: is a last run inside the period that contains "now"?
//!
//! ```text
//! daily   -> same (year, month, day)
//! weekly  -> same (ISO week-numbering year, ISO week)
//! monthly -> same (year, month)
//! ```
//!
//! Dates are compared in the timezone the timestamps carry, so a run at
//! 23:30 local time belongs to that local day regardless of UTC.

use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone};

use crate::model::Frequency;

/// Check whether `last_run` lies in the same `frequency` period as `now`.
#[must_use]
pub fn is_within_window<Tz: TimeZone>(
    last_run: &DateTime<Tz>,
    frequency: Frequency,
    now: &DateTime<Tz>,
) -> bool {
    let last = last_run.date_naive();
    let current = now.date_naive();
    match frequency {
        Frequency::Daily => same_day(last, current),
        Frequency::Weekly => same_iso_week(last, current),
        Frequency::Monthly => same_month(last, current),
    }
}

/// [`is_within_window`] against the wall clock.
#[must_use]
pub fn is_within_current_window(last_run: &DateTime<Local>, frequency: Frequency) -> bool {
    is_within_window(last_run, frequency, &Local::now())
}

/// Same check keyed by a raw frequency tag.
///
/// An unrecognised tag never matches.
#[must_use]
pub fn is_within_window_for_tag<Tz: TimeZone>(
    last_run: &DateTime<Tz>,
    tag: &str,
    now: &DateTime<Tz>,
) -> bool {
    match tag.parse::<Frequency>() {
        Ok(frequency) => is_within_window(last_run, frequency, now),
        Err(error) => {
            tracing::debug!(%error, "treating unrecognised frequency as outside window");
            false
        }
    }
}

fn same_day(a: NaiveDate, b: NaiveDate) -> bool {
    a == b
}

fn same_iso_week(a: NaiveDate, b: NaiveDate) -> bool {
    let (wa, wb) = (a.iso_week(), b.iso_week());
    (wa.year(), wa.week()) == (wb.year(), wb.week())
}

fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    (a.year(), a.month()) == (b.year(), b.month())
}
