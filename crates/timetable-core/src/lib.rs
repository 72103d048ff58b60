//! # timetable-core
//!
//! Computation core of a personal weekly course timetable.
//!
//! Courses recur weekly on a fixed weekday and section span, bounded by a
//! week range. The core turns a snapshot of such courses into two things:
//! conflict-aware display segments for a single day of a single week, and
//! concrete dated occurrences for export into an external calendar.
//!
//! All functions are pure and synchronous over immutable snapshots. Nothing
//! here holds global state or performs I/O; loading courses and writing to a
//! calendar belong to the caller.
//!
//! ## Modules
//!
//! - [`model`]: courses, section times, settings, and course validation
//! - [`week`]: week index and week date arithmetic, display fallbacks
//! - [`segment`]: per-day conflict segmentation
//! - [`materialize`]: lazy expansion of courses into dated occurrences
//! - [`sink`]: calendar store boundary and sync driver
//! - [`error`]: Error types

pub mod error;
pub mod materialize;
pub mod model;
pub mod segment;
pub mod sink;
pub mod week;

pub use error::{DateParseError, MissingSectionTime, TimetableError, ValidationError};
pub use materialize::{
    materialize_course, materialize_schedule, Occurrence, SkippedOccurrence, SyncBatch,
    SyncRequest, WeekRange,
};
pub use model::{
    validate, validate_all, Course, ScheduleSettings, SectionTable, SectionTime, WeekStart,
};
pub use segment::{build_segments, segments_for_day, week_segments, Segment};
pub use sink::{sync_occurrences, CalendarSink, InMemoryCalendar, SyncReport};
pub use week::{current_week_index, display_week, week_columns, week_dates};
