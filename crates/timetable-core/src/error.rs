//! Error types for timetable-core operations.

use thiserror::Error;

/// A course field violated one of the model bounds.
///
/// Returned by [`crate::model::validate`]; a course carrying one of these never
/// reaches segmentation or materialization.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("course id must not be empty")]
    EmptyId,

    #[error("weekday {weekday} is outside 1..=7")]
    WeekdayOutOfRange { weekday: u8 },

    #[error("section {section} is outside 1..={max}")]
    SectionOutOfRange { section: u32, max: u32 },

    #[error("start section {start} is after end section {end}")]
    SectionOrder { start: u32, end: u32 },

    #[error("week {week} is outside 1..={total}")]
    WeekOutOfRange { week: u32, total: u32 },

    #[error("start week {start} is after end week {end}")]
    WeekOrder { start: u32, end: u32 },

    #[error("course id '{id}' is already used by another course")]
    DuplicateId { id: String },
}

/// The semester start date was not a `yyyy-MM-dd` calendar date.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid semester start date '{input}': expected yyyy-MM-dd")]
pub struct DateParseError {
    pub input: String,
}

/// No wall-clock time is configured for a section.
///
/// Soft failure: the affected occurrence is skipped and counted.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("no section time configured for section {section}")]
pub struct MissingSectionTime {
    pub section: u32,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimetableError {
    #[error("Invalid course: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    DateParse(#[from] DateParseError),

    #[error("Invalid section time for section {section}: {reason}")]
    InvalidSectionTime { section: u32, reason: String },

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

pub type Result<T> = std::result::Result<T, TimetableError>;
