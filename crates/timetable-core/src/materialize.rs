//! Expand recurring courses into dated occurrences for a calendar export.
//!
//! Expansion is lazy: [`materialize_course`] and [`materialize_schedule`]
//! return iterators that resolve one week at a time, so a caller syncing a
//! long semester can stop consuming at any point. Both iterators are `Clone`;
//! cloning before consumption gives an independent replay of the same
//! sequence.
//!
//! A malformed semester start date fails the whole call up front. A section
//! without a configured time only drops the affected occurrence, which is
//! recorded as a [`SkippedOccurrence`].

use std::ops::RangeInclusive;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::error::{DateParseError, MissingSectionTime};
use crate::model::{Course, ScheduleSettings, SectionTable};
use crate::week::{offset_date, parse_semester_start};

/// Upper bound for a reminder lead time (one day).
pub const MAX_REMINDER_MINUTES: u32 = 1440;

/// Inclusive week window chosen by the caller of a sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekRange {
    pub first: u32,
    pub last: u32,
}

impl WeekRange {
    pub fn new(first: u32, last: u32) -> Self {
        Self { first, last }
    }

    pub fn is_empty(&self) -> bool {
        self.first > self.last
    }

    /// Number of weeks in the window.
    pub fn len(&self) -> u32 {
        if self.is_empty() {
            0
        } else {
            self.last - self.first + 1
        }
    }

    /// Intersect with the weeks a course runs.
    pub fn clip_to(&self, course: &Course) -> WeekRange {
        WeekRange {
            first: self.first.max(course.start_week),
            last: self.last.min(course.end_week),
        }
    }

    fn weeks(&self) -> RangeInclusive<u32> {
        self.first..=self.last
    }
}

/// What the caller wants exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncRequest {
    pub weeks: WeekRange,
    pub reminder_minutes: Option<u32>,
}

impl SyncRequest {
    pub fn new(weeks: WeekRange) -> Self {
        Self {
            weeks,
            reminder_minutes: None,
        }
    }

    /// Attach a reminder, clamped into `1..=1440` minutes.
    pub fn with_reminder(mut self, minutes: u32) -> Self {
        self.reminder_minutes = Some(minutes.clamp(1, MAX_REMINDER_MINUTES));
        self
    }
}

/// One concrete, dated instance of a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    pub course_id: String,
    pub title: String,
    pub location: String,
    pub description: String,
    pub week: u32,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub reminder_minutes: Option<u32>,
    /// `"{course_id}#{week}"`; stable across retries of the same sync.
    pub dedup_key: String,
}

/// An occurrence dropped because a section had no configured time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedOccurrence {
    pub course_id: String,
    pub week: u32,
    pub missing_section: u32,
}

impl SkippedOccurrence {
    pub fn cause(&self) -> MissingSectionTime {
        MissingSectionTime {
            section: self.missing_section,
        }
    }
}

/// Build the dedup key for a course in a given week.
pub fn dedup_key(course_id: &str, week: u32) -> String {
    format!("{}#{}", course_id, week)
}

/// Calendar date on which `course` meets during `week`.
///
/// Uses the Monday-first convention regardless of display order.
pub fn occurrence_date(semester_start: NaiveDate, week: u32, weekday: u8) -> NaiveDate {
    let days = (i64::from(week) - 1) * 7 + (i64::from(weekday) - 1);
    offset_date(semester_start, days)
}

fn describe(course: &Course) -> String {
    let mut lines = Vec::with_capacity(3);
    if !course.instructor.trim().is_empty() {
        lines.push(format!("Instructor: {}", course.instructor.trim()));
    }
    lines.push(format!(
        "Sections {}-{}",
        course.start_section, course.end_section
    ));
    lines.push(format!("Weeks {}-{}", course.start_week, course.end_week));
    lines.join("\n")
}

/// Lazy occurrences of a single course.
#[derive(Debug, Clone)]
pub struct CourseOccurrences<'a> {
    course: &'a Course,
    sections: &'a SectionTable,
    semester_start: NaiveDate,
    reminder_minutes: Option<u32>,
    weeks: RangeInclusive<u32>,
    description: String,
    skipped: Vec<SkippedOccurrence>,
}

impl<'a> CourseOccurrences<'a> {
    fn new(
        course: &'a Course,
        sections: &'a SectionTable,
        semester_start: NaiveDate,
        request: SyncRequest,
    ) -> Self {
        Self {
            course,
            sections,
            semester_start,
            reminder_minutes: request.reminder_minutes,
            weeks: request.weeks.clip_to(course).weeks(),
            description: describe(course),
            skipped: Vec::new(),
        }
    }

    /// Occurrences skipped so far for missing section times.
    pub fn skipped(&self) -> &[SkippedOccurrence] {
        &self.skipped
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    fn resolve(&self, week: u32) -> Result<Occurrence, MissingSectionTime> {
        let course = self.course;
        let start_time = self
            .sections
            .start_of(course.start_section)
            .ok_or(MissingSectionTime {
                section: course.start_section,
            })?;
        let end_time = self
            .sections
            .end_of(course.end_section)
            .ok_or(MissingSectionTime {
                section: course.end_section,
            })?;

        let date = occurrence_date(self.semester_start, week, course.weekday);
        Ok(Occurrence {
            course_id: course.id.clone(),
            title: course.name.clone(),
            location: course.location.clone(),
            description: self.description.clone(),
            week,
            start: date.and_time(start_time),
            end: date.and_time(end_time),
            reminder_minutes: self.reminder_minutes,
            dedup_key: dedup_key(&course.id, week),
        })
    }
}

impl Iterator for CourseOccurrences<'_> {
    type Item = Occurrence;

    fn next(&mut self) -> Option<Occurrence> {
        while let Some(week) = self.weeks.next() {
            match self.resolve(week) {
                Ok(occurrence) => return Some(occurrence),
                Err(missing) => {
                    tracing::warn!(
                        course_id = %self.course.id,
                        week,
                        section = missing.section,
                        "skipping occurrence: {}",
                        missing
                    );
                    self.skipped.push(SkippedOccurrence {
                        course_id: self.course.id.clone(),
                        week,
                        missing_section: missing.section,
                    });
                }
            }
        }
        None
    }
}

/// Expand one course over the requested weeks.
///
/// Weeks outside the course's own range contribute nothing; an empty
/// intersection yields an empty sequence, not an error.
///
/// # Errors
/// Returns [`DateParseError`] if `semester_start` is not `yyyy-MM-dd`.
pub fn materialize_course<'a>(
    course: &'a Course,
    sections: &'a SectionTable,
    semester_start: &str,
    request: SyncRequest,
) -> Result<CourseOccurrences<'a>, DateParseError> {
    let start = parse_semester_start(semester_start)?;
    Ok(CourseOccurrences::new(course, sections, start, request))
}

/// Lazy occurrences of every course in a snapshot, course by course.
#[derive(Debug, Clone)]
pub struct ScheduleOccurrences<'a> {
    courses: std::slice::Iter<'a, Course>,
    sections: &'a SectionTable,
    semester_start: NaiveDate,
    request: SyncRequest,
    current: Option<CourseOccurrences<'a>>,
    skipped: Vec<SkippedOccurrence>,
}

impl ScheduleOccurrences<'_> {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len() + self.current.as_ref().map_or(0, |c| c.skipped_count())
    }

    /// Drain the remaining occurrences into a [`SyncBatch`].
    pub fn into_batch(mut self) -> SyncBatch {
        let occurrences: Vec<Occurrence> = self.by_ref().collect();
        tracing::debug!(
            occurrences = occurrences.len(),
            skipped = self.skipped.len(),
            "materialized schedule"
        );
        SyncBatch {
            occurrences,
            skipped: self.skipped,
        }
    }
}

impl Iterator for ScheduleOccurrences<'_> {
    type Item = Occurrence;

    fn next(&mut self) -> Option<Occurrence> {
        loop {
            if let Some(current) = self.current.as_mut() {
                if let Some(occurrence) = current.next() {
                    return Some(occurrence);
                }
                self.skipped.append(&mut current.skipped);
                self.current = None;
            }
            let course = self.courses.next()?;
            self.current = Some(CourseOccurrences::new(
                course,
                self.sections,
                self.semester_start,
                self.request,
            ));
        }
    }
}

/// Expand every course in `courses` over the requested weeks.
///
/// # Errors
/// Returns [`DateParseError`] if `settings.semester_start_date` is malformed.
/// Nothing is produced in that case.
pub fn materialize_schedule<'a>(
    courses: &'a [Course],
    sections: &'a SectionTable,
    settings: &ScheduleSettings,
    request: SyncRequest,
) -> Result<ScheduleOccurrences<'a>, DateParseError> {
    let semester_start = parse_semester_start(&settings.semester_start_date)?;
    tracing::debug!(
        courses = courses.len(),
        first_week = request.weeks.first,
        last_week = request.weeks.last,
        "materializing schedule"
    );
    Ok(ScheduleOccurrences {
        courses: courses.iter(),
        sections,
        semester_start,
        request,
        current: None,
        skipped: Vec::new(),
    })
}

/// Fully expanded result of a sync request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncBatch {
    pub occurrences: Vec<Occurrence>,
    pub skipped: Vec<SkippedOccurrence>,
}

impl SyncBatch {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}
