//! Foreground scheduler running the pipeline at a fixed interval.
//!
//! Stops on SIGINT/SIGTERM. A run in progress is finished first.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};

use crate::app::AppContext;

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Interval between runs in seconds (default: 21600 = 6 hours)
    pub interval_secs: u64,
    /// Whether to run immediately on start
    pub run_on_start: bool,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            interval_secs: 6 * 3600,
            run_on_start: true,
        }
    }
}

impl DaemonConfig {
    /// Parse interval string like "1h", "30m", "6h", "1d"
    pub fn parse_interval(s: &str) -> Result<u64, String> {
        let s = s.trim().to_lowercase();

        let secs = if let Some(hours) = s.strip_suffix('h') {
            hours
                .parse::<u64>()
                .map(|h| h * 3600)
                .map_err(|_| format!("Invalid hours: {}", hours))
        } else if let Some(minutes) = s.strip_suffix('m') {
            minutes
                .parse::<u64>()
                .map(|m| m * 60)
                .map_err(|_| format!("Invalid minutes: {}", minutes))
        } else if let Some(days) = s.strip_suffix('d') {
            days.parse::<u64>()
                .map(|d| d * 86400)
                .map_err(|_| format!("Invalid days: {}", days))
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.parse::<u64>()
                .map_err(|_| format!("Invalid seconds: {}", secs))
        } else {
            // Raw seconds
            s.parse::<u64>()
                .map_err(|_| format!("Invalid interval: {}. Use format like '30m', '6h', '1d'", s))
        }?;

        if secs == 0 {
            return Err("Interval must be greater than zero".to_string());
        }
        Ok(secs)
    }

    /// Format interval for display
    pub fn format_interval(secs: u64) -> String {
        if secs >= 86400 && secs.is_multiple_of(86400) {
            format!("{}d", secs / 86400)
        } else if secs >= 3600 && secs.is_multiple_of(3600) {
            format!("{}h", secs / 3600)
        } else if secs >= 60 && secs.is_multiple_of(60) {
            format!("{}m", secs / 60)
        } else {
            format!("{}s", secs)
        }
    }
}

pub struct Daemon {
    ctx: Arc<AppContext>,
    config: DaemonConfig,
    shutdown: Arc<watch::Sender<bool>>,
}

impl Daemon {
    pub fn new(ctx: Arc<AppContext>, config: DaemonConfig) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            ctx,
            config,
            shutdown: Arc::new(shutdown),
        }
    }

    /// Ask the loop to stop after the current run.
    pub fn stop(&self) {
        self.shutdown.send_replace(true);
    }

    fn install_signal_handler(&self) {
        let shutdown = self.shutdown.clone();

        #[cfg(unix)]
        tokio::spawn(async move {
            use tokio::signal::unix::{signal, SignalKind};

            let (mut sigterm, mut sigint) =
                match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                    (Ok(term), Ok(int)) => (term, int),
                    (Err(e), _) | (_, Err(e)) => {
                        warn!(error = %e, "Failed to install signal handlers");
                        return;
                    }
                };

            tokio::select! {
                _ = sigterm.recv() => {},
                _ = sigint.recv() => {},
            }
            info!("Shutdown signal received");
            shutdown.send_replace(true);
        });

        #[cfg(windows)]
        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
            shutdown.send_replace(true);
        });
    }

    pub async fn run(&self) -> crate::app::Result<()> {
        let mut stopped = self.shutdown.subscribe();
        self.install_signal_handler();

        info!(
            interval = %DaemonConfig::format_interval(self.config.interval_secs),
            pid = std::process::id(),
            "Daemon started"
        );

        let mut timer = interval(Duration::from_secs(self.config.interval_secs));
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        timer.tick().await;

        if self.config.run_on_start && !*stopped.borrow() {
            self.run_cycle().await;
        }

        while !*stopped.borrow() {
            tokio::select! {
                _ = timer.tick() => {}
                _ = stopped.changed() => break,
            }
            if *stopped.borrow() {
                break;
            }
            self.run_cycle().await;
        }

        info!("Daemon shutting down");
        Ok(())
    }

    async fn run_cycle(&self) {
        let pipeline = self.ctx.pipeline();
        if pipeline.adapters().is_empty() {
            error!("No enabled sources, skipping scheduled run");
            return;
        }

        info!("Running scheduled scrape");
        let summary = pipeline.run().await;
        info!(
            persisted = summary.persisted(),
            adapters_failed = summary.adapters_failed(),
            elapsed_ms = (summary.finished_at - summary.started_at).num_milliseconds(),
            "Scheduled scrape complete"
        );
    }
}
