pub mod sqlite;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::app::Result;
use crate::domain::EventRecord;

pub use sqlite::SqliteStore;

/// Outcome of a full-refresh write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistReport {
    /// Rows inserted
    pub written: usize,
    /// Rows ignored because their url was already present
    pub skipped: usize,
    pub failures: Vec<RowFailure>,
}

/// A single row the store refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFailure {
    pub title: String,
    pub url: String,
    pub reason: String,
}

/// An event row as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredEvent {
    pub id: i64,
    #[serde(flatten)]
    pub event: EventRecord,
}

/// Columns the listing may be sorted by. Anything else is rejected before
/// it gets near SQL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortColumn {
    #[default]
    Id,
    Title,
    StartTime,
    Platform,
    EventType,
    EventDate,
}

impl SortColumn {
    pub fn column(&self) -> &'static str {
        match self {
            SortColumn::Id => "id",
            SortColumn::Title => "title",
            SortColumn::StartTime => "start_time",
            SortColumn::Platform => "platform",
            SortColumn::EventType => "event_type",
            SortColumn::EventDate => "event_date",
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for SortColumn {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "id" => Ok(SortColumn::Id),
            "title" => Ok(SortColumn::Title),
            "start_time" => Ok(SortColumn::StartTime),
            "platform" => Ok(SortColumn::Platform),
            "event_type" | "type" => Ok(SortColumn::EventType),
            "event_date" | "date" => Ok(SortColumn::EventDate),
            other => Err(format!(
                "Unknown sort column '{}' (expected id, title, start_time, platform, event_type or event_date)",
                other
            )),
        }
    }
}

/// Filters of the listing query. Empty filters are ignored.
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
    /// Platform label, exact match
    pub platform: Option<String>,
    /// Substring of the title
    pub title: Option<String>,
    /// Substring of the event type
    pub event_type: Option<String>,
    pub sort: SortColumn,
    pub descending: bool,
    pub limit: Option<usize>,
}

/// One orchestrator run, as kept in the run log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunRecord {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub raw_count: usize,
    pub unique_count: usize,
    pub persisted_count: usize,
    pub adapters_ok: usize,
    pub adapters_failed: usize,
    /// How the persist phase ended ("persisted", "skipped-empty", "failed")
    pub outcome: String,
}

pub trait EventStore: Send + Sync {
    /// Replace the whole event table with `events`. An empty slice leaves the
    /// table untouched. Rows the store refuses are reported, not fatal.
    fn replace_all(&self, events: &[EventRecord]) -> Result<PersistReport>;

    fn query_events(&self, query: &EventQuery) -> Result<Vec<StoredEvent>>;

    /// Row counts per platform label, largest first.
    fn platform_counts(&self) -> Result<Vec<(String, i64)>>;

    fn count(&self) -> Result<i64>;

    fn record_run(&self, run: &RunRecord) -> Result<i64>;

    fn last_run(&self) -> Result<Option<RunRecord>>;
}
