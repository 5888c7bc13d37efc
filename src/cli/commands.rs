use std::fmt::Write as _;

use crate::app::{AppContext, Result, TicketFeedError};
use crate::config::Config;
use crate::domain::Platform;
use crate::pipeline::{PersistStatus, RunSummary};
use crate::store::{EventQuery, EventStore};

/// Perform one scrape run and print its summary.
pub async fn run_once(ctx: &AppContext) -> Result<RunSummary> {
    let pipeline = ctx.pipeline();
    if pipeline.adapters().is_empty() {
        return Err(TicketFeedError::Other("No enabled sources to scrape".into()));
    }

    let summary = pipeline.run().await;
    print!("{}", format_summary(&summary));
    Ok(summary)
}

pub fn format_summary(summary: &RunSummary) -> String {
    let mut out = String::new();
    for adapter in &summary.adapters {
        let _ = writeln!(
            out,
            "  {:<10} {:>4} events  {:>2}/{} pages  {:.1}s  {}",
            adapter.platform,
            adapter.records,
            adapter.pages_ok,
            adapter.pages_ok + adapter.pages_failed,
            adapter.elapsed.as_secs_f64(),
            adapter.status
        );
    }

    let persisted = match &summary.persist {
        PersistStatus::Persisted(report) if !report.failures.is_empty() => format!(
            "{} persisted, {} rows rejected",
            report.written,
            report.failures.len()
        ),
        PersistStatus::Persisted(report) => format!("{} persisted", report.written),
        PersistStatus::SkippedEmpty => "nothing persisted, previous listing kept".to_string(),
        PersistStatus::Failed(e) => format!("persist failed: {}", e),
    };

    let _ = writeln!(
        out,
        "Run complete: {} fetched, {} unique, {} ({} sources ok, {} failed)",
        summary.raw_count,
        summary.unique_count,
        persisted,
        summary.adapters_ok(),
        summary.adapters_failed()
    );
    out
}

/// Platform keys on the command line map to the stored labels.
fn resolve_platform(input: &str) -> String {
    input
        .parse::<Platform>()
        .map(|p| p.label().to_string())
        .unwrap_or_else(|_| input.trim().to_string())
}

pub fn list_events(ctx: &AppContext, mut query: EventQuery, json: bool) -> Result<()> {
    query.platform = query.platform.as_deref().map(resolve_platform);
    let events = ctx.store.query_events(&query)?;

    if json {
        let out = serde_json::to_string_pretty(&events)
            .map_err(|e| TicketFeedError::Other(format!("Failed to encode JSON: {}", e)))?;
        println!("{}", out);
        return Ok(());
    }

    if events.is_empty() {
        println!("No events");
        return Ok(());
    }

    for stored in events {
        let event = stored.event;
        println!(
            "[{}] {} ({}, {})\n  {}",
            event.platform, event.title, event.start_time, event.event_type, event.url
        );
    }

    Ok(())
}

pub fn show_stats(ctx: &AppContext) -> Result<()> {
    let total = ctx.store.count()?;
    println!("{} events", total);

    for (platform, count) in ctx.store.platform_counts()? {
        println!("  {:<10} {}", platform, count);
    }

    match ctx.store.last_run()? {
        Some(run) => println!(
            "Last update: {} ({}, {} fetched, {} persisted, {} sources failed)",
            run.finished_at
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S"),
            run.outcome,
            run.raw_count,
            run.persisted_count,
            run.adapters_failed
        ),
        None => println!("Last update: N/A"),
    }

    Ok(())
}

pub fn list_sources(config: &Config) {
    for source in &config.sources {
        let strategies: Vec<String> = source.strategies.iter().map(|s| s.to_string()).collect();
        println!(
            "{} {:<9} {:<10} {} page(s) via {}",
            if source.enabled { "+" } else { "-" },
            source.platform.key(),
            source.platform.label(),
            source.pages.len(),
            strategies.join(" → ")
        );
        for page in &source.pages {
            match &page.category {
                Some(category) => println!("    {}: {}", category, page.url),
                None => println!("    {}", page.url),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chrono::Utc;

    use crate::pipeline::{AdapterReport, AdapterStatus};
    use crate::store::PersistReport;

    #[test]
    fn test_resolve_platform() {
        assert_eq!(resolve_platform("kham"), "寬宏");
        assert_eq!(resolve_platform("KKTIX"), "KKTIX");
        assert_eq!(resolve_platform("Somewhere Else"), "Somewhere Else");
    }

    #[test]
    fn test_format_summary() {
        let now = Utc::now();
        let summary = RunSummary {
            started_at: now,
            finished_at: now,
            raw_count: 3,
            unique_count: 2,
            adapters: vec![
                AdapterReport {
                    platform: "KKTIX".into(),
                    status: AdapterStatus::Succeeded,
                    records: 3,
                    pages_ok: 1,
                    pages_failed: 0,
                    elapsed: Duration::from_millis(1500),
                },
                AdapterReport {
                    platform: "iBon".into(),
                    status: AdapterStatus::TimedOut,
                    records: 0,
                    pages_ok: 0,
                    pages_failed: 0,
                    elapsed: Duration::ZERO,
                },
            ],
            persist: PersistStatus::Persisted(PersistReport {
                written: 2,
                ..Default::default()
            }),
        };

        let text = format_summary(&summary);
        assert!(text.contains("KKTIX"));
        assert!(text.contains("timed out"));
        assert!(text.contains("3 fetched, 2 unique, 2 persisted (1 sources ok, 1 failed)"));
    }

    #[test]
    fn test_list_and_stats_on_empty_store() {
        let mut config = Config::default();
        config.browser.enabled = false;
        let ctx = AppContext::in_memory(config).unwrap();

        assert!(list_events(&ctx, EventQuery::default(), false).is_ok());
        assert!(list_events(&ctx, EventQuery::default(), true).is_ok());
        assert!(show_stats(&ctx).is_ok());
    }
}
