//! CLI module
//!
//! Provides command-line interface for:
//! - start: Boot the system and serve the API
//! - check: Validate configuration and datasets, then exit

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check, run, run_command, start};
pub use errors::{CliError, CliErrorCode, CliResult};
