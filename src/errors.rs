// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum JobmonError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Scenario error: {0}")]
    ScenarioError(String),

    #[error("Invalid job id: {0}")]
    InvalidJobId(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Writing to the transcript sink failed. Never retried by the monitor.
    #[error("Sink error: {0}")]
    SinkError(#[source] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failure reported by a status or event source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Worth retrying after the poll interval (timeouts land here too).
    #[error("transient source error: {0}")]
    Transient(String),

    /// The source will not recover; the monitor gives up immediately.
    #[error("permanent source error: {0}")]
    Permanent(String),
}

impl SourceError {
    pub fn is_transient(&self) -> bool {
        matches!(self, SourceError::Transient(_))
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, JobmonError>;
