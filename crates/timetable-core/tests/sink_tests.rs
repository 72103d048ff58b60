//! Tests for driving a calendar sink with materialized occurrences.

use std::fmt;

use timetable_core::sink::InsertOutcome;
use timetable_core::{
    materialize_schedule, sync_occurrences, CalendarSink, Course, InMemoryCalendar, Occurrence,
    ScheduleSettings, SectionTable, SyncReport, SyncRequest, WeekRange,
};

fn course(id: &str, weekday: u8, sections: (u32, u32), weeks: (u32, u32)) -> Course {
    Course {
        id: id.to_string(),
        name: id.to_string(),
        location: String::new(),
        instructor: String::new(),
        weekday,
        start_section: sections.0,
        end_section: sections.1,
        start_week: weeks.0,
        end_week: weeks.1,
        color: 0,
    }
}

fn settings() -> ScheduleSettings {
    ScheduleSettings {
        semester_start_date: "2024-09-02".to_string(),
        ..ScheduleSettings::default()
    }
}

#[derive(Debug)]
struct StoreFull;

impl fmt::Display for StoreFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "calendar store is full")
    }
}

impl std::error::Error for StoreFull {}

/// Accepts `capacity` inserts, then fails every call.
struct FlakySink {
    capacity: usize,
    inner: InMemoryCalendar,
}

impl CalendarSink for FlakySink {
    type Error = StoreFull;

    fn insert(&mut self, occurrence: &Occurrence) -> Result<InsertOutcome, StoreFull> {
        if self.inner.len() >= self.capacity && !self.inner.contains(&occurrence.dedup_key) {
            return Err(StoreFull);
        }
        Ok(self.inner.insert(occurrence).unwrap_or(InsertOutcome::Duplicate))
    }
}

// ---------------------------------------------------------------------------
// InMemoryCalendar
// ---------------------------------------------------------------------------

#[test]
fn sync_inserts_every_occurrence() {
    let courses = vec![course("a", 1, (1, 2), (1, 4)), course("b", 3, (3, 4), (2, 3))];
    let table = SectionTable::with_default_hours(10);
    let mut calendar = InMemoryCalendar::new();

    let occurrences = materialize_schedule(
        &courses,
        &table,
        &settings(),
        SyncRequest::new(WeekRange::new(1, 20)),
    )
    .unwrap();
    let report = sync_occurrences(occurrences, &mut calendar).unwrap();

    assert_eq!(
        report,
        SyncReport {
            inserted: 6,
            duplicates: 0,
            skipped: 0
        }
    );
    assert_eq!(calendar.len(), 6);
    assert!(calendar.contains("b#3"));
}

#[test]
fn retrying_a_sync_does_not_duplicate() {
    let courses = vec![course("a", 1, (1, 2), (1, 4))];
    let table = SectionTable::with_default_hours(10);
    let request = SyncRequest::new(WeekRange::new(1, 20));
    let mut calendar = InMemoryCalendar::new();

    let first = materialize_schedule(&courses, &table, &settings(), request).unwrap();
    sync_occurrences(first, &mut calendar).unwrap();
    let second = materialize_schedule(&courses, &table, &settings(), request).unwrap();
    let report = sync_occurrences(second, &mut calendar).unwrap();

    assert_eq!(report.inserted, 0);
    assert_eq!(report.duplicates, 4);
    assert_eq!(calendar.len(), 4);
}

#[test]
fn report_includes_skipped_occurrences() {
    let courses = vec![course("late", 2, (9, 10), (1, 16))];
    let table = SectionTable::with_default_hours(9);
    let mut calendar = InMemoryCalendar::new();

    let occurrences = materialize_schedule(
        &courses,
        &table,
        &settings(),
        SyncRequest::new(WeekRange::new(1, 20)),
    )
    .unwrap();
    let report = sync_occurrences(occurrences, &mut calendar).unwrap();

    assert_eq!(report.inserted, 0);
    assert_eq!(report.skipped, 16);
    assert!(calendar.is_empty());
}

#[test]
fn events_are_ordered_by_start() {
    let courses = vec![course("fri", 5, (1, 1), (1, 1)), course("mon", 1, (1, 1), (1, 1))];
    let table = SectionTable::with_default_hours(10);
    let mut calendar = InMemoryCalendar::new();

    let occurrences = materialize_schedule(
        &courses,
        &table,
        &settings(),
        SyncRequest::new(WeekRange::new(1, 1)),
    )
    .unwrap();
    sync_occurrences(occurrences, &mut calendar).unwrap();

    let keys: Vec<&str> = calendar
        .events()
        .iter()
        .map(|o| o.dedup_key.as_str())
        .collect();
    assert_eq!(keys, vec!["mon#1", "fri#1"]);
}

// ---------------------------------------------------------------------------
// Partial failure
// ---------------------------------------------------------------------------

#[test]
fn sink_failure_reports_progress_and_retry_completes() {
    let courses = vec![course("a", 1, (1, 2), (1, 5))];
    let table = SectionTable::with_default_hours(10);
    let request = SyncRequest::new(WeekRange::new(1, 20));
    let mut sink = FlakySink {
        capacity: 3,
        inner: InMemoryCalendar::new(),
    };

    let occurrences = materialize_schedule(&courses, &table, &settings(), request).unwrap();
    let failure = sync_occurrences(occurrences, &mut sink).unwrap_err();

    assert_eq!(failure.partial.inserted, 3);
    assert_eq!(failure.dedup_key, "a#4");
    assert!(failure.to_string().contains("calendar store is full"));

    // Store gets room; the retry only writes what is missing.
    sink.capacity = 10;
    let occurrences = materialize_schedule(&courses, &table, &settings(), request).unwrap();
    let report = sync_occurrences(occurrences, &mut sink).unwrap();

    assert_eq!(report.inserted, 2);
    assert_eq!(report.duplicates, 3);
    assert_eq!(sink.inner.len(), 5);
}
