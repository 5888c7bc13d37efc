//! The orchestrator: adapters → normalization → store.
//!
//! ```text
//! Idle → Fetching(adapter_i)… → Normalizing → Persisting → Done
//! ```
//!
//! Adapters run as tasks gated by a semaphore. A failed, panicked or
//! overdue adapter contributes nothing and the run carries on.

pub mod config;
pub mod summary;

pub use config::PipelineConfig;
pub use summary::{AdapterReport, AdapterStatus, PersistStatus, RunSummary};

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{watch, Semaphore};
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::domain::RawEvent;
use crate::fetcher::Fetcher;
use crate::normalizer::Normalizer;
use crate::sources::{AdapterError, Extraction, SourceAdapter};
use crate::store::EventStore;

/// Where a run currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Fetching {
        platform: String,
        index: usize,
        total: usize,
    },
    Normalizing,
    Persisting,
    Done,
}

type AdapterOutcome = (Result<Extraction, AdapterError>, Duration);

pub struct Pipeline {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    fetcher: Arc<dyn Fetcher>,
    normalizer: Normalizer,
    store: Arc<dyn EventStore>,
    config: PipelineConfig,
    phase: Arc<watch::Sender<RunPhase>>,
}

impl Pipeline {
    pub fn new(
        adapters: Vec<Arc<dyn SourceAdapter>>,
        fetcher: Arc<dyn Fetcher>,
        normalizer: Normalizer,
        store: Arc<dyn EventStore>,
        config: PipelineConfig,
    ) -> Self {
        let (phase, _) = watch::channel(RunPhase::Idle);
        Self {
            adapters,
            fetcher,
            normalizer,
            store,
            config,
            phase: Arc::new(phase),
        }
    }

    /// Follow the run's progress.
    pub fn subscribe(&self) -> watch::Receiver<RunPhase> {
        self.phase.subscribe()
    }

    pub fn adapters(&self) -> &[Arc<dyn SourceAdapter>] {
        &self.adapters
    }

    pub async fn run(&self) -> RunSummary {
        let started_at = Utc::now();
        let deadline = Instant::now() + self.config.deadline();
        info!(
            adapters = self.adapters.len(),
            workers = self.config.workers,
            "Starting run"
        );

        let (raw, adapters) = self.fetch_all(deadline).await;

        self.phase.send_replace(RunPhase::Normalizing);
        let records = self.normalizer.normalize(&raw);

        self.phase.send_replace(RunPhase::Persisting);
        let persist = if records.is_empty() {
            warn!("Run produced no events, keeping the stored listing");
            PersistStatus::SkippedEmpty
        } else {
            match self.store.replace_all(&records) {
                Ok(report) => PersistStatus::Persisted(report),
                Err(e) => {
                    error!(error = %e, "Failed to persist events");
                    PersistStatus::Failed(e.to_string())
                }
            }
        };

        let summary = RunSummary {
            started_at,
            finished_at: Utc::now(),
            raw_count: raw.len(),
            unique_count: records.len(),
            adapters,
            persist,
        };

        if let Err(e) = self.store.record_run(&summary.to_run_record()) {
            warn!(error = %e, "Failed to record run");
        }

        self.fetcher.shutdown().await;
        self.phase.send_replace(RunPhase::Done);

        info!(
            raw = summary.raw_count,
            unique = summary.unique_count,
            persisted = summary.persisted(),
            adapters_ok = summary.adapters_ok(),
            adapters_failed = summary.adapters_failed(),
            "Run finished"
        );
        summary
    }

    async fn fetch_all(&self, deadline: Instant) -> (Vec<RawEvent>, Vec<AdapterReport>) {
        let semaphore = Arc::new(Semaphore::new(self.config.workers.max(1)));
        let total = self.adapters.len();
        let mut handles = Vec::with_capacity(total);

        for (index, adapter) in self.adapters.iter().enumerate() {
            let adapter = adapter.clone();
            let fetcher = self.fetcher.clone();
            let semaphore = semaphore.clone();
            let phase = self.phase.clone();
            let delay = self.config.adapter_delay;

            let handle = tokio::spawn(async move {
                let permit = semaphore.acquire_owned().await.ok();
                phase.send_replace(RunPhase::Fetching {
                    platform: adapter.platform().to_string(),
                    index,
                    total,
                });

                let started = Instant::now();
                let result = adapter.extract(fetcher.as_ref()).await;
                let elapsed = started.elapsed();

                // The permit stays taken through the politeness pause, but the
                // result is handed back right away.
                if let Some(permit) = permit {
                    tokio::spawn(async move {
                        delay.sleep().await;
                        drop(permit);
                    });
                }

                (result, elapsed)
            });

            handles.push(handle);
        }

        let mut raw = Vec::new();
        let mut reports = Vec::with_capacity(total);

        for (adapter, mut handle) in self.adapters.iter().zip(handles) {
            let platform = adapter.platform().to_string();

            let outcome: Result<AdapterOutcome, AdapterStatus> =
                match tokio::time::timeout_at(deadline, &mut handle).await {
                    Ok(Ok(outcome)) => Ok(outcome),
                    Ok(Err(e)) => {
                        error!(%platform, "Task join error: {}", e);
                        Err(AdapterStatus::Failed(format!("adapter task failed: {}", e)))
                    }
                    Err(_) => {
                        handle.abort();
                        warn!(%platform, "Deadline reached, abandoning adapter");
                        Err(AdapterStatus::TimedOut)
                    }
                };

            let report = match outcome {
                Ok((Ok(extraction), elapsed)) => {
                    info!(
                        %platform,
                        records = extraction.events.len(),
                        pages_ok = extraction.pages_ok,
                        pages_failed = extraction.pages_failed,
                        "Adapter finished"
                    );
                    let report = AdapterReport {
                        platform,
                        status: AdapterStatus::Succeeded,
                        records: extraction.events.len(),
                        pages_ok: extraction.pages_ok,
                        pages_failed: extraction.pages_failed,
                        elapsed,
                    };
                    raw.extend(extraction.events);
                    report
                }
                Ok((Err(e), elapsed)) => {
                    warn!(%platform, error = %e, "Adapter failed");
                    let pages_failed = match &e {
                        AdapterError::AllPagesFailed { pages, .. } => *pages,
                        AdapterError::Other(_) => 0,
                    };
                    AdapterReport {
                        platform,
                        status: AdapterStatus::Failed(e.to_string()),
                        records: 0,
                        pages_ok: 0,
                        pages_failed,
                        elapsed,
                    }
                }
                Err(status) => AdapterReport {
                    platform,
                    status,
                    records: 0,
                    pages_ok: 0,
                    pages_failed: 0,
                    elapsed: Duration::ZERO,
                },
            };

            reports.push(report);
        }

        (raw, reports)
    }
}
