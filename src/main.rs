use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ticketfeed::app::AppContext;
use ticketfeed::cli::{commands, Cli, Commands};
use ticketfeed::config::{Config, Settings};
use ticketfeed::daemon::{Daemon, DaemonConfig};
use ticketfeed::store::EventQuery;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        None => {
            let ctx = open(config)?;
            commands::run_once(&ctx).await?;
        }
        Some(Commands::Run { workers, deadline }) => {
            if let Some(workers) = workers {
                config.pipeline.workers = workers;
            }
            if let Some(deadline) = deadline {
                config.pipeline.deadline_secs = deadline;
            }
            let ctx = open(config)?;
            commands::run_once(&ctx).await?;
        }
        Some(Commands::Daemon {
            interval,
            no_initial_run,
        }) => {
            let interval_secs = DaemonConfig::parse_interval(&interval).map_err(anyhow::Error::msg)?;
            let ctx = Arc::new(open(config)?);
            let daemon = Daemon::new(
                ctx,
                DaemonConfig {
                    interval_secs,
                    run_on_start: !no_initial_run,
                },
            );
            daemon.run().await?;
        }
        Some(Commands::List {
            platform,
            search,
            event_type,
            sort,
            desc,
            limit,
            json,
        }) => {
            let ctx = open(config)?;
            let query = EventQuery {
                platform,
                title: search,
                event_type,
                sort,
                descending: desc,
                limit,
            };
            commands::list_events(&ctx, query, json)?;
        }
        Some(Commands::Stats) => {
            let ctx = open(config)?;
            commands::show_stats(&ctx)?;
        }
        Some(Commands::Sources) => commands::list_sources(&config),
    }

    Ok(())
}

/// The store location is only required by commands that touch the store.
fn open(config: Config) -> anyhow::Result<AppContext> {
    let settings = Settings::from_env()?;
    Ok(AppContext::new(config, &settings)?)
}
