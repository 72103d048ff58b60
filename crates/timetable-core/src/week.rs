//! Week arithmetic anchored on the semester start date.
//!
//! Week 1 starts on `semester_start_date`, which is taken to be a Monday.
//! Internally days are always ordered Monday..Sunday; the configured
//! [`WeekStart`] only rotates what is handed back for display.
//!
//! The strict functions ([`current_week_index`], [`week_dates`]) surface a
//! [`DateParseError`]. The display helpers ([`display_week`],
//! [`week_date_labels`], [`week_columns`]) never fail: a malformed start date
//! degrades to week 1 and `"--"` placeholders.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::error::DateParseError;
use crate::model::{ScheduleSettings, WeekStart, DAYS_PER_WEEK};

/// Placeholder shown in place of a date when the start date is unusable.
pub const PLACEHOLDER_LABEL: &str = "--";

const WEEKDAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Parse an ISO `yyyy-MM-dd` semester start date.
pub fn parse_semester_start(input: &str) -> Result<NaiveDate, DateParseError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| DateParseError {
        input: input.to_string(),
    })
}

/// `start + days`, saturating at the ends of chrono's calendar instead of panicking.
pub(crate) fn offset_date(start: NaiveDate, days: i64) -> NaiveDate {
    Duration::try_days(days)
        .and_then(|d| start.checked_add_signed(d))
        .unwrap_or(if days < 0 {
            NaiveDate::MIN
        } else {
            NaiveDate::MAX
        })
}

/// Week index of `today` relative to an already-parsed start date.
///
/// `floor(days / 7) + 1`; dates before the start give indices `<= 0`.
pub fn week_index_between(today: NaiveDate, semester_start: NaiveDate) -> i64 {
    today
        .signed_duration_since(semester_start)
        .num_days()
        .div_euclid(7)
        + 1
}

/// Week index of `today`. Not clamped; see [`clamp_week`].
pub fn current_week_index(today: NaiveDate, semester_start: &str) -> Result<i64, DateParseError> {
    let start = parse_semester_start(semester_start)?;
    Ok(week_index_between(today, start))
}

/// The seven dates of week `week_index`, in display order.
pub fn week_dates_from(
    semester_start: NaiveDate,
    week_index: i64,
    week_start: WeekStart,
) -> [NaiveDate; 7] {
    let week_offset = week_index.saturating_sub(1).saturating_mul(7);
    let mut dates: [NaiveDate; 7] = std::array::from_fn(|i| {
        offset_date(semester_start, week_offset.saturating_add(i as i64))
    });
    if week_start == WeekStart::Sunday {
        // [Mon..Sun] -> [Sun, Mon..Sat]
        dates.rotate_right(1);
    }
    dates
}

/// The seven dates of week `week_index`, in display order.
pub fn week_dates(
    semester_start: &str,
    week_index: i64,
    week_start: WeekStart,
) -> Result<[NaiveDate; 7], DateParseError> {
    let start = parse_semester_start(semester_start)?;
    Ok(week_dates_from(start, week_index, week_start))
}

/// Clamp a raw week index into `[1, total_weeks]`.
pub fn clamp_week(week_index: i64, total_weeks: u32) -> u32 {
    let upper = i64::from(total_weeks.max(1));
    week_index.clamp(1, upper) as u32
}

/// Week to show on screen for `today`: clamped, and week 1 if the start date is bad.
pub fn display_week(today: NaiveDate, settings: &ScheduleSettings) -> u32 {
    match current_week_index(today, &settings.semester_start_date) {
        Ok(week) => clamp_week(week, settings.total_weeks),
        Err(err) => {
            tracing::warn!(error = %err, "falling back to week 1");
            1
        }
    }
}

/// `MM/dd` labels for the header of a week, or seven placeholders.
pub fn week_date_labels(semester_start: &str, week_index: i64, week_start: WeekStart) -> Vec<String> {
    match week_dates(semester_start, week_index, week_start) {
        Ok(dates) => dates.iter().map(|d| d.format("%m/%d").to_string()).collect(),
        Err(err) => {
            tracing::warn!(error = %err, "showing placeholder week dates");
            vec![PLACEHOLDER_LABEL.to_string(); DAYS_PER_WEEK as usize]
        }
    }
}

/// Short English name of a weekday number (1 = Monday). `"?"` when out of range.
pub fn weekday_name(weekday: u8) -> &'static str {
    weekday
        .checked_sub(1)
        .and_then(|i| WEEKDAY_NAMES.get(usize::from(i)))
        .copied()
        .unwrap_or("?")
}

/// Weekday numbers in the order the columns are displayed.
pub fn display_order(week_start: WeekStart) -> [u8; 7] {
    match week_start {
        WeekStart::Monday => [1, 2, 3, 4, 5, 6, 7],
        WeekStart::Sunday => [7, 1, 2, 3, 4, 5, 6],
    }
}

/// One header column of the week grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayColumn {
    pub weekday: u8,
    pub name: &'static str,
    pub date: Option<NaiveDate>,
    /// `MM/dd`, or [`PLACEHOLDER_LABEL`] when `date` is `None`.
    pub label: String,
}

/// Header columns for `week`, in display order, honoring `show_weekends`.
pub fn week_columns(settings: &ScheduleSettings, week: u32) -> Vec<DayColumn> {
    let dates = match week_dates(
        &settings.semester_start_date,
        i64::from(week),
        settings.week_start,
    ) {
        Ok(dates) => Some(dates),
        Err(err) => {
            tracing::warn!(error = %err, week, "week header without dates");
            None
        }
    };

    display_order(settings.week_start)
        .into_iter()
        .enumerate()
        .filter(|(_, weekday)| settings.show_weekends || *weekday <= 5)
        .map(|(slot, weekday)| {
            let date = dates.map(|d| d[slot]);
            DayColumn {
                weekday,
                name: weekday_name(weekday),
                date,
                label: date
                    .map(|d| d.format("%m/%d").to_string())
                    .unwrap_or_else(|| PLACEHOLDER_LABEL.to_string()),
            }
        })
        .collect()
}
