use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::store::{PersistReport, RunRecord};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterStatus {
    Succeeded,
    Failed(String),
    TimedOut,
}

impl fmt::Display for AdapterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterStatus::Succeeded => f.write_str("ok"),
            AdapterStatus::Failed(reason) => write!(f, "failed: {}", reason),
            AdapterStatus::TimedOut => f.write_str("timed out"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AdapterReport {
    pub platform: String,
    pub status: AdapterStatus,
    pub records: usize,
    pub pages_ok: usize,
    pub pages_failed: usize,
    pub elapsed: Duration,
}

impl AdapterReport {
    pub fn succeeded(&self) -> bool {
        self.status == AdapterStatus::Succeeded
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistStatus {
    Persisted(PersistReport),
    /// Nothing survived normalization; the store was left alone.
    SkippedEmpty,
    Failed(String),
}

impl PersistStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PersistStatus::Persisted(_) => "persisted",
            PersistStatus::SkippedEmpty => "skipped-empty",
            PersistStatus::Failed(_) => "failed",
        }
    }

    pub fn written(&self) -> usize {
        match self {
            PersistStatus::Persisted(report) => report.written,
            _ => 0,
        }
    }
}

/// Terminal report of one orchestrator run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Records handed over by adapters, duplicates included
    pub raw_count: usize,
    /// Records left after normalization and dedup
    pub unique_count: usize,
    pub adapters: Vec<AdapterReport>,
    pub persist: PersistStatus,
}

impl RunSummary {
    pub fn persisted(&self) -> usize {
        self.persist.written()
    }

    pub fn adapters_ok(&self) -> usize {
        self.adapters.iter().filter(|a| a.succeeded()).count()
    }

    pub fn adapters_failed(&self) -> usize {
        self.adapters.len() - self.adapters_ok()
    }

    pub fn to_run_record(&self) -> RunRecord {
        RunRecord {
            started_at: self.started_at,
            finished_at: self.finished_at,
            raw_count: self.raw_count,
            unique_count: self.unique_count,
            persisted_count: self.persisted(),
            adapters_ok: self.adapters_ok(),
            adapters_failed: self.adapters_failed(),
            outcome: self.persist.label().to_string(),
        }
    }
}
