// src/logging.rs

//! Diagnostics for the `jobmon` binary, via `tracing-subscriber`.
//!
//! The level comes from `--log-level`, else `JOBMON_LOG`, else `info`. It is
//! applied to jobmon's own events; dependencies stay at `warn`.
//!
//! Everything goes to stderr so that stdout carries only the job transcript.

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::cli::LogLevel;

/// Env var consulted when no `--log-level` is given.
pub const LOG_ENV: &str = "JOBMON_LOG";

/// Install the global subscriber. Fails if one is already set.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env_level = std::env::var(LOG_ENV).ok();
    let level = resolve_level(cli_level, env_level.as_deref());

    tracing_subscriber::fmt()
        .with_env_filter(filter_for(level))
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("initialising logging: {e}"))?;

    Ok(())
}

/// Pick the effective level. An unparsable env value is ignored.
pub fn resolve_level(cli_level: Option<LogLevel>, env_value: Option<&str>) -> Level {
    if let Some(lvl) = cli_level {
        return Level::from(lvl);
    }
    env_value.and_then(parse_level).unwrap_or(Level::INFO)
}

fn filter_for(level: Level) -> EnvFilter {
    EnvFilter::new(format!("warn,jobmon={}", level.as_str().to_lowercase()))
}

fn parse_level(s: &str) -> Option<Level> {
    match s.trim().to_ascii_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}

impl From<LogLevel> for Level {
    fn from(lvl: LogLevel) -> Self {
        match lvl {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}
