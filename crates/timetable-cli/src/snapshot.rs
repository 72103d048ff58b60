//! Loading a timetable snapshot from JSON.
//!
//! ```json
//! {
//!   "settings": { "semesterStartDate": "2024-09-02", "totalWeeks": 20, "weekStartDay": 1 },
//!   "sectionTimes": [{ "section": 1, "startTime": "08:00", "endTime": "08:45" }],
//!   "courses": [{ "id": "calc", "name": "Calculus", "weekday": 1, ... }]
//! }
//! ```
//!
//! Missing `settings` take their defaults; missing `sectionTimes` fall back to
//! the default hourly table sized by `maxSections`.

use anyhow::{Context, Result};
use serde::Deserialize;
use timetable_core::{validate_all, Course, ScheduleSettings, SectionTable, ValidationError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSnapshot {
    #[serde(default)]
    settings: ScheduleSettings,
    #[serde(default)]
    section_times: Option<SectionTable>,
    #[serde(default)]
    courses: Vec<Course>,
}

/// A parsed snapshot whose courses have all passed validation.
#[derive(Debug)]
pub struct Snapshot {
    pub settings: ScheduleSettings,
    pub sections: SectionTable,
    pub courses: Vec<Course>,
    pub rejected: Vec<(String, ValidationError)>,
}

impl Snapshot {
    /// Parse and validate. Invalid courses are set aside in `rejected`.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawSnapshot =
            serde_json::from_str(json).context("Failed to parse timetable snapshot")?;
        raw.settings
            .check()
            .context("Snapshot settings are unusable")?;

        let sections = raw
            .section_times
            .unwrap_or_else(|| SectionTable::with_default_hours(raw.settings.max_sections));
        let validated = validate_all(raw.courses, &raw.settings);
        tracing::info!(
            accepted = validated.accepted.len(),
            rejected = validated.rejected.len(),
            sections = sections.len(),
            "snapshot loaded"
        );

        Ok(Self {
            settings: raw.settings,
            sections,
            courses: validated.accepted,
            rejected: validated.rejected,
        })
    }

    /// Display name of a course id, falling back to the id itself.
    pub fn course_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.courses
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.as_str())
            .unwrap_or(id)
    }
}
