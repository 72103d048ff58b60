//! Collapse one day's courses into non-overlapping display segments.
//!
//! A segment is a maximal run of consecutive sections that share exactly the
//! same set of active course ids. Runs with more than one id are conflict
//! groups; every course present at a section belongs to that section's group,
//! so three-way (or wider) overlaps come out as a single segment rather than a
//! set of pairwise conflicts.
//!
//! Segmentation is recomputed from scratch on every call. It is
//! `O(courses × span)` and the span is bounded by the number of sections in a
//! day.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::model::{Course, DAYS_PER_WEEK};

/// A contiguous section range and the courses occupying all of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub start_section: u32,
    pub end_section: u32,
    pub course_ids: BTreeSet<String>,
    pub is_conflict: bool,
}

impl Segment {
    fn new(start_section: u32, end_section: u32, course_ids: BTreeSet<String>) -> Self {
        let is_conflict = course_ids.len() > 1;
        Self {
            start_section,
            end_section,
            course_ids,
            is_conflict,
        }
    }

    /// Number of sections covered.
    pub fn width(&self) -> u32 {
        self.end_section - self.start_section + 1
    }

    pub fn contains(&self, section: u32) -> bool {
        self.start_section <= section && section <= self.end_section
    }
}

/// Segments for one weekday of one week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySegments {
    pub weekday: u8,
    pub segments: Vec<Segment>,
}

/// Build segments from courses already filtered to a single weekday and week.
///
/// The output covers exactly the union of the input section ranges, in
/// ascending order, with no two adjacent segments sharing the same id set.
/// Sections no course covers produce no segment.
pub fn build_segments<'a, I>(courses: I) -> Vec<Segment>
where
    I: IntoIterator<Item = &'a Course>,
{
    let courses: Vec<&Course> = courses.into_iter().collect();

    let (Some(lo), Some(hi)) = (
        courses.iter().map(|c| c.start_section).min(),
        courses.iter().map(|c| c.end_section).max(),
    ) else {
        return Vec::new();
    };

    let ids_at = |section: u32| -> BTreeSet<String> {
        courses
            .iter()
            .filter(|c| c.covers_section(section))
            .map(|c| c.id.clone())
            .collect()
    };

    let mut segments = Vec::new();
    let mut run_start = lo;
    let mut run_ids = ids_at(lo);

    for section in lo + 1..=hi {
        let ids = ids_at(section);
        if ids != run_ids {
            if !run_ids.is_empty() {
                segments.push(Segment::new(run_start, section - 1, run_ids));
            }
            run_start = section;
            run_ids = ids;
        }
    }
    if !run_ids.is_empty() {
        segments.push(Segment::new(run_start, hi, run_ids));
    }

    tracing::trace!(
        courses = courses.len(),
        segments = segments.len(),
        "segmented day"
    );
    segments
}

/// Courses that meet on `weekday` during `week`.
pub fn courses_on(courses: &[Course], weekday: u8, week: u32) -> impl Iterator<Item = &Course> {
    courses
        .iter()
        .filter(move |c| c.weekday == weekday && c.is_active_on(week))
}

/// Filter `courses` to one weekday and week, then segment.
pub fn segments_for_day(courses: &[Course], weekday: u8, week: u32) -> Vec<Segment> {
    build_segments(courses_on(courses, weekday, week))
}

/// Segments for every weekday (Monday..Sunday) of `week`.
pub fn week_segments(courses: &[Course], week: u32) -> Vec<DaySegments> {
    (1..=DAYS_PER_WEEK)
        .map(|weekday| DaySegments {
            weekday,
            segments: segments_for_day(courses, weekday, week),
        })
        .collect()
}
