//! `timetable` CLI: inspect week grids and export course occurrences from a
//! JSON timetable snapshot.
//!
//! ## Usage
//!
//! ```sh
//! # Show this week's grid (week computed from today's date)
//! timetable week -i timetable.json
//!
//! # Show a specific week as JSON
//! timetable week -i timetable.json --week 5 --json
//!
//! # Expand weeks 1-20 into calendar events (stdout JSON)
//! timetable sync -i timetable.json --from 1 --to 20 --reminder 15
//!
//! # Report courses that fail validation
//! timetable validate -i timetable.json
//! ```
//!
//! Diagnostics go to stderr and are controlled by `RUST_LOG`.

mod snapshot;

use std::io::{self, Read};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde_json::json;
use timetable_core::week::clamp_week;
use timetable_core::{
    display_week, materialize_schedule, sync_occurrences, week_columns, week_segments,
    InMemoryCalendar, Segment, SyncRequest, WeekRange,
};
use tracing_subscriber::EnvFilter;

use crate::snapshot::Snapshot;

#[derive(Parser)]
#[command(
    name = "timetable",
    version,
    about = "Weekly course timetable: week grids and calendar export"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the segmented grid for one week
    Week {
        /// Snapshot file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Week to show; defaults to the week containing --today
        #[arg(short, long)]
        week: Option<i64>,
        /// Reference date (yyyy-MM-dd); defaults to the local date
        #[arg(long)]
        today: Option<String>,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Expand courses into dated calendar events
    Sync {
        /// Snapshot file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// First week to export
        #[arg(long, default_value_t = 1)]
        from: u32,
        /// Last week to export; defaults to the snapshot's total weeks
        #[arg(long)]
        to: Option<u32>,
        /// Reminder lead time in minutes (clamped to 1..=1440)
        #[arg(long)]
        reminder: Option<u32>,
    },
    /// Check every course against the snapshot settings
    Validate {
        /// Snapshot file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
}

fn main() -> Result<()> {
    // stdout carries data; keep diagnostics on stderr.
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Week {
            input,
            week,
            today,
            json,
        } => {
            let snapshot = load_snapshot(input.as_deref())?;
            let week = match week {
                Some(week) => clamp_week(week, snapshot.settings.total_weeks),
                None => display_week(resolve_today(today.as_deref())?, &snapshot.settings),
            };
            let rendered = if json {
                render_week_json(&snapshot, week)?
            } else {
                render_week_text(&snapshot, week)
            };
            print!("{}", rendered);
        }
        Commands::Sync {
            input,
            output,
            from,
            to,
            reminder,
        } => {
            let snapshot = load_snapshot(input.as_deref())?;
            let last = to.unwrap_or(snapshot.settings.total_weeks);
            let mut request = SyncRequest::new(WeekRange::new(from, last));
            if let Some(minutes) = reminder {
                request = request.with_reminder(minutes);
            }

            let occurrences = materialize_schedule(
                &snapshot.courses,
                &snapshot.sections,
                &snapshot.settings,
                request,
            )
            .context("Refusing to export: semester start date is invalid")?;

            let mut calendar = InMemoryCalendar::new();
            let report = sync_occurrences(occurrences, &mut calendar)
                .context("Failed to write calendar events")?;
            tracing::info!(
                inserted = report.inserted,
                skipped = report.skipped,
                "sync complete"
            );

            let body = json!({
                "weeks": { "first": from, "last": last },
                "inserted": report.inserted,
                "duplicates": report.duplicates,
                "skipped": report.skipped,
                "events": calendar.events(),
            });
            let pretty = serde_json::to_string_pretty(&body)?;
            write_output(output.as_deref(), &pretty)?;
        }
        Commands::Validate { input } => {
            let snapshot = load_snapshot(input.as_deref())?;
            for (id, reason) in &snapshot.rejected {
                println!("rejected {}: {}", id, reason);
            }
            println!(
                "{} accepted, {} rejected",
                snapshot.courses.len(),
                snapshot.rejected.len()
            );
            if !snapshot.rejected.is_empty() {
                anyhow::bail!("{} course(s) failed validation", snapshot.rejected.len());
            }
        }
    }

    Ok(())
}

fn load_snapshot(path: Option<&str>) -> Result<Snapshot> {
    let json = read_input(path)?;
    let snapshot = Snapshot::from_json(&json)?;
    for (id, reason) in &snapshot.rejected {
        tracing::warn!(course_id = %id, %reason, "ignoring invalid course");
    }
    Ok(snapshot)
}

fn resolve_today(today: Option<&str>) -> Result<NaiveDate> {
    match today {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .with_context(|| format!("Invalid --today date: {}", raw)),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

fn describe_segment(snapshot: &Snapshot, segment: &Segment) -> String {
    let names: Vec<&str> = segment
        .course_ids
        .iter()
        .map(|id| snapshot.course_name(id))
        .collect();
    let span = if segment.start_section == segment.end_section {
        format!("{}", segment.start_section)
    } else {
        format!("{}-{}", segment.start_section, segment.end_section)
    };
    if segment.is_conflict {
        format!("  [{}] CONFLICT: {}", span, names.join(" | "))
    } else {
        format!("  [{}] {}", span, names.join(""))
    }
}

fn render_week_text(snapshot: &Snapshot, week: u32) -> String {
    let days = week_segments(&snapshot.courses, week);
    let mut out = format!("Week {} of {}\n", week, snapshot.settings.total_weeks);
    for column in week_columns(&snapshot.settings, week) {
        out.push_str(&format!("{} {}\n", column.name, column.label));
        let segments = days
            .iter()
            .find(|d| d.weekday == column.weekday)
            .map(|d| d.segments.as_slice())
            .unwrap_or_default();
        for segment in segments {
            out.push_str(&describe_segment(snapshot, segment));
            out.push('\n');
        }
    }
    out
}

fn render_week_json(snapshot: &Snapshot, week: u32) -> Result<String> {
    let days = week_segments(&snapshot.courses, week);
    let columns: Vec<_> = week_columns(&snapshot.settings, week)
        .into_iter()
        .map(|column| {
            let segments = days
                .iter()
                .find(|d| d.weekday == column.weekday)
                .map(|d| d.segments.clone())
                .unwrap_or_default();
            json!({
                "weekday": column.weekday,
                "name": column.name,
                "date": column.date,
                "label": column.label,
                "segments": segments,
            })
        })
        .collect();
    let body = json!({ "week": week, "days": columns });
    let mut pretty = serde_json::to_string_pretty(&body)?;
    pretty.push('\n');
    Ok(pretty)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
