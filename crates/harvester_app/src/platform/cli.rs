use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use super::logging::LogDestination;

/// Harvest a product listing into a local corpus and query it.
#[derive(Debug, Parser)]
#[command(name = "harvester", version)]
pub struct Cli {
    /// RON settings file. Defaults to ./harvester.ron when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the corpus snapshot.
    #[arg(long, global = true, default_value = "./harvest")]
    pub store: PathBuf,

    #[arg(long, global = true, value_enum, default_value_t = LogTarget::Terminal)]
    pub log: LogTarget,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    Terminal,
    File,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Seed a new corpus from the listing, replacing the stored one.
    Initial {
        /// Items to reveal; defaults to the configured initial target.
        #[arg(long)]
        target: Option<usize>,
    },
    /// Activate the listing's "reveal more" control once and merge new items.
    More,
    /// Summarize the stored corpus.
    Status,
    /// Search, filter and page through the stored records.
    Query(QueryArgs),
    /// Print one stored record as JSON.
    Show { id: String },
}

#[derive(Debug, Clone, clap::Args)]
pub struct QueryArgs {
    /// Case-insensitive text matched against title and brand.
    #[arg(long)]
    pub q: Option<String>,
    #[arg(long)]
    pub brand: Option<String>,
    #[arg(long)]
    pub min_price: Option<f64>,
    #[arg(long)]
    pub max_price: Option<f64>,
    /// Minimum rating; unrated records are excluded.
    #[arg(long)]
    pub rating: Option<f64>,
    #[arg(long, default_value_t = 1)]
    pub page: usize,
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Command, LogTarget};

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::parse_from(["harvester", "initial", "--target", "24", "--log", "both"]);
        assert_eq!(cli.log, LogTarget::Both);
        assert!(matches!(cli.command, Command::Initial { target: Some(24) }));
        assert_eq!(cli.store.to_str(), Some("./harvest"));
    }

    #[test]
    fn query_flags_parse() {
        let cli = Cli::parse_from([
            "harvester",
            "--store",
            "/tmp/corpus",
            "query",
            "--q",
            "oled",
            "--max-price",
            "50000",
            "--page",
            "2",
        ]);
        let Command::Query(args) = cli.command else {
            panic!("expected query");
        };
        assert_eq!(args.q.as_deref(), Some("oled"));
        assert_eq!(args.max_price, Some(50_000.0));
        assert_eq!(args.page, 2);
        assert_eq!(args.limit, 20);
    }
}
