//! CLI argument definitions using clap
//!
//! Commands:
//! - timetable-api start --config <path>
//! - timetable-api check --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Timetable API - key-gated read API over GTFS datasets
#[derive(Parser, Debug)]
#[command(name = "timetable-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open the datasets, start the refresh schedules and serve the API
    Start {
        /// Path to configuration file
        #[arg(long, default_value = "./config.json")]
        config: PathBuf,
    },

    /// Validate the configuration and open every dataset, then exit
    Check {
        /// Path to configuration file
        #[arg(long, default_value = "./config.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
