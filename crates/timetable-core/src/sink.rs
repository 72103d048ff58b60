//! Boundary to the external calendar store.
//!
//! The core never writes to a calendar itself. A collaborator implements
//! [`CalendarSink`] and [`sync_occurrences`] feeds it. Writes are not
//! transactional: if the sink fails halfway the report says how far it got,
//! and re-running the same sync is safe as long as the sink honors
//! [`Occurrence::dedup_key`].

use std::collections::BTreeMap;

use serde::Serialize;

use crate::materialize::{Occurrence, ScheduleOccurrences};

/// Result of handing one occurrence to a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// An event with the same dedup key already exists; nothing was written.
    Duplicate,
}

/// A calendar store that accepts occurrences one at a time.
pub trait CalendarSink {
    type Error: std::error::Error;

    fn insert(&mut self, occurrence: &Occurrence) -> Result<InsertOutcome, Self::Error>;
}

/// Counts reported back to whoever started the sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub inserted: usize,
    pub duplicates: usize,
    pub skipped: usize,
}

/// A sync that stopped on a sink error.
#[derive(Debug)]
pub struct SyncFailure<E> {
    /// Counts up to (not including) the failed occurrence.
    pub partial: SyncReport,
    pub dedup_key: String,
    pub error: E,
}

impl<E: std::fmt::Display> std::fmt::Display for SyncFailure<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "calendar insert failed at {} after {} inserted: {}",
            self.dedup_key, self.partial.inserted, self.error
        )
    }
}

impl<E: std::error::Error + 'static> std::error::Error for SyncFailure<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Drain `occurrences` into `sink`, stopping at the first sink error.
pub fn sync_occurrences<S: CalendarSink>(
    mut occurrences: ScheduleOccurrences<'_>,
    sink: &mut S,
) -> Result<SyncReport, SyncFailure<S::Error>> {
    let mut report = SyncReport::default();
    while let Some(occurrence) = occurrences.next() {
        match sink.insert(&occurrence) {
            Ok(InsertOutcome::Inserted) => report.inserted += 1,
            Ok(InsertOutcome::Duplicate) => report.duplicates += 1,
            Err(error) => {
                report.skipped = occurrences.skipped_count();
                tracing::warn!(
                    dedup_key = %occurrence.dedup_key,
                    inserted = report.inserted,
                    "calendar sink rejected occurrence"
                );
                return Err(SyncFailure {
                    partial: report,
                    dedup_key: occurrence.dedup_key,
                    error,
                });
            }
        }
    }
    report.skipped = occurrences.skipped_count();
    tracing::debug!(
        inserted = report.inserted,
        duplicates = report.duplicates,
        skipped = report.skipped,
        "sync finished"
    );
    Ok(report)
}

/// In-process calendar keyed by dedup key. Inserting a key twice is a no-op.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCalendar {
    events: BTreeMap<String, Occurrence>,
}

impl InMemoryCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn contains(&self, dedup_key: &str) -> bool {
        self.events.contains_key(dedup_key)
    }

    /// Stored events ordered by start time, then dedup key.
    pub fn events(&self) -> Vec<&Occurrence> {
        let mut events: Vec<&Occurrence> = self.events.values().collect();
        events.sort_by(|a, b| (a.start, &a.dedup_key).cmp(&(b.start, &b.dedup_key)));
        events
    }
}

impl CalendarSink for InMemoryCalendar {
    type Error = std::convert::Infallible;

    fn insert(&mut self, occurrence: &Occurrence) -> Result<InsertOutcome, Self::Error> {
        if self.events.contains_key(&occurrence.dedup_key) {
            return Ok(InsertOutcome::Duplicate);
        }
        self.events
            .insert(occurrence.dedup_key.clone(), occurrence.clone());
        Ok(InsertOutcome::Inserted)
    }
}
