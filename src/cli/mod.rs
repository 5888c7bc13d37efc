pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::store::SortColumn;

#[derive(Parser)]
#[command(name = "ticketfeed")]
#[command(about = "Aggregates Taiwanese ticketing listings into one event feed", long_about = None)]
pub struct Cli {
    /// Path to the config file (default: $TICKETFEED_CONFIG or ~/.config/ticketfeed/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Without a subcommand a single scrape run is performed
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scrape every enabled source once and replace the stored listing
    Run {
        /// Number of adapters running at the same time
        #[arg(short, long)]
        workers: Option<usize>,

        /// Overall deadline for the fetch phase, in seconds
        #[arg(short, long)]
        deadline: Option<u64>,
    },
    /// Run scrapes periodically in the foreground
    Daemon {
        /// Interval between runs (e.g., "30m", "6h", "1d")
        #[arg(short, long, default_value = "6h")]
        interval: String,

        /// Wait one interval before the first run
        #[arg(long)]
        no_initial_run: bool,
    },
    /// List stored events
    List {
        /// Only events of this platform (label or key, e.g. "KKTIX", "kham")
        #[arg(short, long)]
        platform: Option<String>,

        /// Only events whose title contains this text
        #[arg(short, long)]
        search: Option<String>,

        /// Only events whose type contains this text
        #[arg(short = 't', long = "type")]
        event_type: Option<String>,

        /// Sort column: id, title, start_time, platform, event_type, event_date
        #[arg(long, default_value = "id")]
        sort: SortColumn,

        /// Sort descending
        #[arg(long)]
        desc: bool,

        /// Maximum number of rows
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Per-platform counts and the last run
    Stats,
    /// Show the configured sources
    Sources,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_run() {
        let cli = Cli::parse_from(["ticketfeed"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_list_args() {
        let cli = Cli::parse_from([
            "ticketfeed", "list", "--platform", "kktix", "--type", "concert", "--sort", "title",
            "--desc", "--json",
        ]);
        match cli.command {
            Some(Commands::List {
                platform,
                event_type,
                sort,
                desc,
                json,
                ..
            }) => {
                assert_eq!(platform.as_deref(), Some("kktix"));
                assert_eq!(event_type.as_deref(), Some("concert"));
                assert_eq!(sort, SortColumn::Title);
                assert!(desc && json);
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::parse_from(["ticketfeed", "run", "--workers", "2", "--config", "tf.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("tf.toml")));
        assert!(matches!(
            cli.command,
            Some(Commands::Run {
                workers: Some(2),
                deadline: None
            })
        ));
    }

    #[test]
    fn test_bad_sort_column_rejected() {
        assert!(Cli::try_parse_from(["ticketfeed", "list", "--sort", "url"]).is_err());
    }
}
