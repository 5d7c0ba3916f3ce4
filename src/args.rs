use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::{
    model::{
        constants::{DEFAULT_COUNTRY, DEFAULT_ROSTER_LIMIT, MAX_ROSTER_LIMIT},
        structures::{battalion::Battalion, medal_type::MedalType}
    },
    report::ReportFormat
};

#[derive(Parser, Clone, Debug)]
#[command(
    display_name = "WarEra Battalions",
    version,
    about = "Ranks the players of a WarEra country and manages its battalions",
    long_about = "Fetches the weekly damage ranking of a WarEra country, caches it in SQLite \
    and keeps track of battalion assignments, weekly medals and reports"
)]
pub struct Args {
    /// SQLite connection string, e.g. sqlite://data/warera.db
    #[arg(
        short,
        long,
        env = "DATABASE_URL",
        default_value = "sqlite://data/warera.db",
        help = "Database connection string"
    )]
    pub database_url: String,

    /// Country whose players are managed
    #[arg(short, long, env = "WARERA_COUNTRY", default_value = DEFAULT_COUNTRY)]
    pub country: String,

    /// Overrides the stored API token for this run
    #[arg(short, long, env = "WARERA_BEARER_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short,
        long,
        env = "RUST_LOG",
        default_value = "info",
        value_parser = ["trace", "debug", "info", "warn", "error"],
        help = "Sets the logging verbosity"
    )]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command
}

#[derive(Subcommand, Clone, Debug, PartialEq)]
pub enum Command {
    /// List every country with its weekly damage
    Countries,

    /// Fetch fresh ranking data for the country
    Refresh,

    /// Show the top soldiers of a battalion
    Show {
        #[arg(value_parser = parse_battalion)]
        battalion: Battalion,

        #[arg(
            short = 'n',
            long,
            default_value_t = DEFAULT_ROSTER_LIMIT,
            value_parser = clap::value_parser!(u16).range(1..=MAX_ROSTER_LIMIT as i64)
        )]
        limit: u16
    },

    /// List players, optionally only those whose name contains FILTER
    Players { filter: Option<String> },

    /// Damage split across battalions
    Summary,

    /// Assign players to a battalion (UNASSIGNED removes them)
    Assign {
        #[arg(value_parser = parse_battalion)]
        battalion: Battalion,

        #[arg(required = true)]
        players: Vec<String>
    },

    /// Award a medal to a player for a week
    Medal {
        #[arg(value_parser = parse_medal)]
        medal: MedalType,

        player: String,

        /// Week identifier such as week_2025_23; defaults to the current week
        #[arg(short, long)]
        week: Option<String>
    },

    /// Write the cached country data to a JSON file
    Export { file: PathBuf },

    /// Load country data from a JSON file
    Import { file: PathBuf },

    /// Remove every cached record of the country
    ClearCache,

    /// Store the API bearer token
    SetToken { token: String },

    /// Write a report file
    Report {
        #[command(subcommand)]
        kind: ReportKind,

        #[arg(short, long, value_enum, default_value_t = ReportFormat::Html, global = true)]
        format: ReportFormat,

        #[arg(short, long, default_value = "reports", global = true)]
        output_dir: PathBuf
    },

    /// Database statistics and soldiers per battalion
    Status,

    /// Compact the database file
    Vacuum
}

#[derive(Subcommand, Clone, Debug, PartialEq)]
pub enum ReportKind {
    /// Damage split across battalions
    Summary,

    /// Full roster of one battalion
    Battalion {
        #[arg(value_parser = parse_battalion)]
        battalion: Battalion
    }
}

fn parse_battalion(value: &str) -> Result<Battalion, String> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("unknown battalion '{}', expected CONDOR, YAGUARETE, CARPINCHO or UNASSIGNED", value))
}

fn parse_medal(value: &str) -> Result<MedalType, String> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("unknown medal '{}', expected gold, silver or bronze", value))
}
