//! Table and JSON rendering of job states.

use std::fmt::Write as _;

use chrono::{DateTime, Local};
use crossterm::style::{StyledContent, Stylize};
use serde::Serialize;

use cronmon_sniffer::{Job, JobState, JobStatus, OverallHealth, Severity, group_by_frequency};

const TITLE: &str = "Cron job status";
const HEADERS: [&str; 5] = ["#", "Status", "Job name", "Details", "Last run"];
const LAST_RUN_FORMAT: &str = "%d-%m-%Y %H:%M";

/// How to lay out the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Emit ANSI colours.
    pub color: bool,
    /// Section the rows by frequency.
    pub grouped: bool,
}

struct Row {
    number: String,
    status: JobStatus,
    name: String,
    details: String,
    last_run: String,
}

/// Icon shown next to a status label.
#[must_use]
pub fn status_icon(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Running => "⏳",
        JobStatus::Success => "🟢",
        JobStatus::Stale => "🟡",
        JobStatus::Failed | JobStatus::Crashed => "🔴",
        JobStatus::Missing | JobStatus::Error => "⚪",
        JobStatus::Unknown => "❓",
    }
}

/// Render the status table. `states` is positionally aligned with `jobs`.
#[must_use]
pub fn render_table(jobs: &[Job], states: &[JobState], options: RenderOptions) -> String {
    let rows: Vec<Row> = jobs
        .iter()
        .zip(states)
        .enumerate()
        .map(|(index, (job, state))| Row {
            number: (index + 1).to_string(),
            status: state.status(),
            name: job.name.clone(),
            details: state.message().to_string(),
            last_run: state
                .last_modification_time()
                .map(|t| t.format(LAST_RUN_FORMAT).to_string())
                .unwrap_or_default(),
        })
        .collect();

    let widths = column_widths(&rows);
    let mut out = String::new();
    let _ = writeln!(out, "{}", paint(TITLE, options.color, |s| s.bold()));
    push_header(&mut out, &widths, options.color);

    if options.grouped {
        for (section, (frequency, members)) in group_by_frequency(jobs).into_iter().enumerate() {
            if section > 0 {
                out.push('\n');
            }
            let label = format!("{} jobs", capitalize_first(frequency.as_str()));
            let _ = writeln!(out, "{}", paint(&label, options.color, |s| s.dim()));
            for (index, _) in members {
                if let Some(row) = rows.get(index) {
                    push_row(&mut out, row, &widths, options.color);
                }
            }
        }
    } else {
        for row in &rows {
            push_row(&mut out, row, &widths, options.color);
        }
    }

    let health = OverallHealth::from_states(states);
    let _ = writeln!(
        out,
        "\n{}",
        paint(health.description(), options.color, |s| match health {
            OverallHealth::Healthy => s.green(),
            OverallHealth::Warning => s.yellow(),
            OverallHealth::Failing => s.red().bold(),
        })
    );
    out
}

#[derive(Serialize)]
struct StateRecord<'a> {
    number: usize,
    name: &'a str,
    frequency: &'a str,
    status: JobStatus,
    message: &'a str,
    // Lossy so one non-UTF-8 path cannot fail the whole batch.
    file: Option<String>,
    last_modification_time: Option<DateTime<Local>>,
}

/// Render states as a pretty-printed JSON array, one entry per job.
///
/// # Errors
///
/// Returns the serializer error.
pub fn render_json(jobs: &[Job], states: &[JobState]) -> serde_json::Result<String> {
    let records: Vec<StateRecord<'_>> = jobs
        .iter()
        .zip(states)
        .enumerate()
        .map(|(index, (job, state))| StateRecord {
            number: index + 1,
            name: &job.name,
            frequency: job.frequency.as_str(),
            status: state.status(),
            message: state.message(),
            file: state.file().map(|path| path.to_string_lossy().into_owned()),
            last_modification_time: state.last_modification_time(),
        })
        .collect();
    serde_json::to_string_pretty(&records)
}

fn column_widths(rows: &[Row]) -> [usize; 5] {
    let mut widths = HEADERS.map(str::len);
    // The status cell is "<icon> <LABEL>"; the icon is padded separately.
    let longest_label = JobStatus::ALL
        .iter()
        .map(|s| s.as_str().len())
        .max()
        .unwrap_or(0);
    widths[1] = widths[1].max(3 + longest_label);
    for row in rows {
        widths[0] = widths[0].max(row.number.chars().count());
        widths[2] = widths[2].max(row.name.chars().count());
        widths[3] = widths[3].max(row.details.chars().count());
        widths[4] = widths[4].max(row.last_run.chars().count());
    }
    widths
}

fn push_header(out: &mut String, widths: &[usize; 5], color: bool) {
    let cells: Vec<String> = HEADERS
        .iter()
        .zip(widths)
        .map(|(header, width)| pad(header, *width))
        .collect();
    let _ = writeln!(out, "{}", paint(cells.join("  ").trim_end(), color, |s| s.bold()));
    let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
    let _ = writeln!(out, "{}", rule.join("  "));
}

fn push_row(out: &mut String, row: &Row, widths: &[usize; 5], color: bool) {
    let label = pad(row.status.as_str(), widths[1].saturating_sub(3));
    let status = paint(&label, color, |s| match row.status.severity() {
        Severity::Ok if row.status == JobStatus::Running => s.cyan().bold(),
        Severity::Ok => s.green().bold(),
        Severity::Warn => s.yellow().bold(),
        Severity::Fail => s.red().bold(),
    });
    let line = format!(
        "{}  {} {}  {}  {}  {}",
        paint(&pad(&row.number, widths[0]), color, |s| s.dim()),
        status_icon(row.status),
        status,
        pad(&row.name, widths[2]),
        paint(&pad(&row.details, widths[3]), color, |s| s.dim()),
        row.last_run,
    );
    let _ = writeln!(out, "{}", line.trim_end());
}

fn pad(text: &str, width: usize) -> String {
    format!("{text:<width$}")
}

fn paint<F>(text: &str, color: bool, style: F) -> String
where
    F: FnOnce(StyledContent<&str>) -> StyledContent<&str>,
{
    if color {
        style(text.stylize()).to_string()
    } else {
        text.to_string()
    }
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
