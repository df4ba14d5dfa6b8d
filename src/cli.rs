use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::settings::Tour;

#[derive(Parser, Debug)]
#[command(author, version, about = "Tennis match win-probability estimator")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
    /// Circuit whose matches are ingested or modelled
    #[arg(long, global = true, value_enum, default_value_t = Tour::Atp)]
    pub tour: Tour,
    /// Build the rank-gap table only from matches up to this date (YYYY-MM-DD)
    #[arg(long, global = true)]
    pub table_until: Option<NaiveDate>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Clean a match export and store it as the corpus
    Ingest {
        /// JSON array of raw match rows
        #[arg(short, long)]
        input: PathBuf,
        /// Add to the stored corpus instead of replacing it
        #[arg(long, default_value_t = false)]
        append: bool,
        /// Store as recent matches that feed form and head-to-head but not
        /// the rank-gap table
        #[arg(long, default_value_t = false)]
        supplement: bool,
    },
    /// Estimate who wins a match between two players
    Predict {
        player_a: String,
        player_b: String,
        /// Weight of the head-to-head term (0 ignores it)
        #[arg(short, long)]
        lambda: Option<f64>,
        /// Per-meeting recency decay for the head-to-head record
        #[arg(short, long)]
        gamma: Option<f64>,
        /// Only use matches up to this date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
    /// Run every request of a JSON file, reporting failures without stopping
    Batch {
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Print a player's recent-form series
    Form { player: String },
    /// Print the rank-gap probability table
    Table,
    /// Start the HTTP server
    Serve {
        /// Port number (optional, defaults to 3000)
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
}
