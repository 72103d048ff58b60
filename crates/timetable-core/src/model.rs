//! Course, section-time and settings entities, plus the invariants a course
//! must satisfy before the rest of the crate will look at it.
//!
//! Everything here is a plain value snapshot. Callers that own a live,
//! editable collection hand the core a fresh snapshot after every edit.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TimetableError, ValidationError};

/// Number of weekdays in the internal Monday-first convention.
pub const DAYS_PER_WEEK: u8 = 7;

/// A weekly-recurring class block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub name: String,
    #[serde(default, alias = "room")]
    pub location: String,
    #[serde(default, alias = "teacher")]
    pub instructor: String,
    /// 1 = Monday ... 7 = Sunday, regardless of display order.
    #[serde(alias = "day")]
    pub weekday: u8,
    pub start_section: u32,
    pub end_section: u32,
    pub start_week: u32,
    pub end_week: u32,
    /// Packed ARGB display color. Never interpreted by the core.
    #[serde(default)]
    pub color: u32,
}

impl Course {
    /// Whether the course runs in the given week (`start_week <= week <= end_week`).
    pub fn is_active_on(&self, week: u32) -> bool {
        self.start_week <= week && week <= self.end_week
    }

    /// Whether the course occupies the given section on its weekday.
    pub fn covers_section(&self, section: u32) -> bool {
        self.start_section <= section && section <= self.end_section
    }
}

/// Free-function form of [`Course::is_active_on`].
pub fn active_on(course: &Course, week: u32) -> bool {
    course.is_active_on(week)
}

/// First column of the displayed week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum WeekStart {
    /// `weekStartDay == 0`
    Sunday,
    /// `weekStartDay == 1`
    #[default]
    Monday,
}

impl TryFrom<u8> for WeekStart {
    type Error = TimetableError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(WeekStart::Sunday),
            1 => Ok(WeekStart::Monday),
            other => Err(TimetableError::InvalidSettings(format!(
                "weekStartDay must be 0 (Sunday) or 1 (Monday), got {}",
                other
            ))),
        }
    }
}

impl From<WeekStart> for u8 {
    fn from(value: WeekStart) -> Self {
        match value {
            WeekStart::Sunday => 0,
            WeekStart::Monday => 1,
        }
    }
}

/// Parameters shared by validation, week arithmetic and materialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleSettings {
    /// ISO `yyyy-MM-dd` date of week 1, weekday 1. Kept as text so that each
    /// call site decides how to react to a malformed value.
    pub semester_start_date: String,
    pub total_weeks: u32,
    #[serde(rename = "weekStartDay")]
    pub week_start: WeekStart,
    pub max_sections: u32,
    pub show_weekends: bool,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            semester_start_date: String::new(),
            total_weeks: 20,
            week_start: WeekStart::Monday,
            max_sections: 10,
            show_weekends: true,
        }
    }
}

impl ScheduleSettings {
    /// Reject settings no course could ever satisfy.
    pub fn check(&self) -> Result<()> {
        if self.total_weeks == 0 {
            return Err(TimetableError::InvalidSettings(
                "totalWeeks must be at least 1".to_string(),
            ));
        }
        if self.max_sections == 0 {
            return Err(TimetableError::InvalidSettings(
                "maxSections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Wall-clock span of one section. Carries no date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionTime {
    pub section: u32,
    #[serde(alias = "start", with = "time_of_day")]
    pub start_time: NaiveTime,
    #[serde(alias = "end", with = "time_of_day")]
    pub end_time: NaiveTime,
}

impl SectionTime {
    pub fn new(section: u32, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            section,
            start_time,
            end_time,
        }
    }
}

/// Section index → [`SectionTime`] lookup.
///
/// Indices missing from the table are "unmapped"; lookups return `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<SectionTime>", into = "Vec<SectionTime>")]
pub struct SectionTable {
    entries: BTreeMap<u32, SectionTime>,
}

impl SectionTable {
    /// Build a table, rejecting index 0, duplicates, spans that do not end
    /// after they start, and spans that begin before the previous section ends.
    pub fn new(times: impl IntoIterator<Item = SectionTime>) -> Result<Self> {
        let mut entries = BTreeMap::new();
        for time in times {
            if time.section == 0 {
                return Err(TimetableError::InvalidSectionTime {
                    section: 0,
                    reason: "section indices start at 1".to_string(),
                });
            }
            if time.end_time <= time.start_time {
                return Err(TimetableError::InvalidSectionTime {
                    section: time.section,
                    reason: format!(
                        "end {} is not after start {}",
                        time.end_time.format("%H:%M"),
                        time.start_time.format("%H:%M")
                    ),
                });
            }
            if entries.insert(time.section, time).is_some() {
                return Err(TimetableError::InvalidSectionTime {
                    section: time.section,
                    reason: "duplicate entry".to_string(),
                });
            }
        }
        for (prev, next) in entries.values().zip(entries.values().skip(1)) {
            if next.start_time < prev.end_time {
                return Err(TimetableError::InvalidSectionTime {
                    section: next.section,
                    reason: format!(
                        "start {} is before section {} ends at {}",
                        next.start_time.format("%H:%M"),
                        prev.section,
                        prev.end_time.format("%H:%M")
                    ),
                });
            }
        }
        Ok(Self { entries })
    }

    /// `count` sections where section `i` runs `{7+i}:00`–`{7+i}:45`.
    ///
    /// Sections whose hour would pass 23 are left unmapped.
    pub fn with_default_hours(count: u32) -> Self {
        let entries = (1..=count)
            .filter_map(|section| {
                let hour = 7 + section;
                let start = NaiveTime::from_hms_opt(hour, 0, 0)?;
                let end = NaiveTime::from_hms_opt(hour, 45, 0)?;
                Some((section, SectionTime::new(section, start, end)))
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, section: u32) -> Option<&SectionTime> {
        self.entries.get(&section)
    }

    pub fn start_of(&self, section: u32) -> Option<NaiveTime> {
        self.get(section).map(|t| t.start_time)
    }

    pub fn end_of(&self, section: u32) -> Option<NaiveTime> {
        self.get(section).map(|t| t.end_time)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending section order.
    pub fn iter(&self) -> impl Iterator<Item = &SectionTime> {
        self.entries.values()
    }
}

impl TryFrom<Vec<SectionTime>> for SectionTable {
    type Error = TimetableError;

    fn try_from(value: Vec<SectionTime>) -> Result<Self> {
        SectionTable::new(value)
    }
}

impl From<SectionTable> for Vec<SectionTime> {
    fn from(value: SectionTable) -> Self {
        value.entries.into_values().collect()
    }
}

/// Check a course against the model bounds, returning it unchanged when valid.
///
/// Checks run in a fixed order (id, weekday, sections, weeks) so that the
/// first violated bound is the one reported.
pub fn validate(
    course: Course,
    settings: &ScheduleSettings,
) -> std::result::Result<Course, ValidationError> {
    if course.id.trim().is_empty() {
        return Err(ValidationError::EmptyId);
    }
    if !(1..=DAYS_PER_WEEK).contains(&course.weekday) {
        return Err(ValidationError::WeekdayOutOfRange {
            weekday: course.weekday,
        });
    }

    if course.start_section > course.end_section {
        return Err(ValidationError::SectionOrder {
            start: course.start_section,
            end: course.end_section,
        });
    }
    for section in [course.start_section, course.end_section] {
        if section < 1 || section > settings.max_sections {
            return Err(ValidationError::SectionOutOfRange {
                section,
                max: settings.max_sections,
            });
        }
    }

    if course.start_week > course.end_week {
        return Err(ValidationError::WeekOrder {
            start: course.start_week,
            end: course.end_week,
        });
    }
    for week in [course.start_week, course.end_week] {
        if week < 1 || week > settings.total_weeks {
            return Err(ValidationError::WeekOutOfRange {
                week,
                total: settings.total_weeks,
            });
        }
    }

    Ok(course)
}

/// Outcome of validating a whole snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Validated {
    pub accepted: Vec<Course>,
    /// `(course id, reason)` for every course that was turned away.
    pub rejected: Vec<(String, ValidationError)>,
}

/// Validate every course, keeping snapshot order in both halves.
///
/// Ids must be unique: a course whose id was already accepted is rejected
/// with [`ValidationError::DuplicateId`].
pub fn validate_all(courses: Vec<Course>, settings: &ScheduleSettings) -> Validated {
    let mut out = Validated::default();
    let mut seen = BTreeSet::new();
    for course in courses {
        let id = course.id.clone();
        let checked = validate(course, settings).and_then(|course| {
            if seen.contains(&course.id) {
                Err(ValidationError::DuplicateId {
                    id: course.id.clone(),
                })
            } else {
                Ok(course)
            }
        });
        match checked {
            Ok(course) => {
                seen.insert(course.id.clone());
                out.accepted.push(course);
            }
            Err(reason) => {
                tracing::debug!(course_id = %id, %reason, "course rejected");
                out.rejected.push((id, reason));
            }
        }
    }
    out
}

/// Parse a wall-clock time written as `H:MM`, `HH:MM` or `HH:MM:SS`.
pub fn parse_time_of_day(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .ok()
}

mod time_of_day {
    use chrono::{NaiveTime, Timelike};
    use serde::{de, Deserialize, Deserializer, Serializer};

    /// `HH:MM`, or `HH:MM:SS` when the seconds are non-zero.
    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        let pattern = if time.second() == 0 { "%H:%M" } else { "%H:%M:%S" };
        serializer.serialize_str(&time.format(pattern).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time_of_day(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid time of day '{}'", raw)))
    }
}
