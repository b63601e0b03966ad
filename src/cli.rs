// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `jobmon`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "jobmon",
    version,
    about = "Follow a scripted job and print its map/reduce progress.",
    long_about = None
)]
pub struct CliArgs {
    /// Scenario file (TOML) describing the job and its status polls.
    #[arg(long, value_name = "PATH")]
    pub job: PathBuf,

    /// Monitor config file (TOML). Built-in defaults are used if omitted.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `JOBMON_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate config and scenario, print them, but don't monitor.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
