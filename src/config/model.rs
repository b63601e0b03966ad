// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::types::TaskStatusFilter;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [monitor]
/// poll_interval_ms = 1000
/// completion_poll_interval_ms = 5000
/// progress_reporting = true
/// status_timeout_ms = 10000
/// max_status_retries = 5
/// event_batch_size = 10
/// task_output_filter = "failed"
/// ```
///
/// Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub monitor: MonitorSection,
}

/// `[monitor]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorSection {
    /// Delay between two status polls while progress is being reported.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Delay between two status polls when progress reporting is off.
    #[serde(default = "default_completion_poll_interval_ms")]
    pub completion_poll_interval_ms: u64,

    /// When false, only the final summary line is written.
    #[serde(default = "default_progress_reporting")]
    pub progress_reporting: bool,

    /// Upper bound for a single status request; exceeding it counts as a
    /// transient failure.
    #[serde(default = "default_status_timeout_ms")]
    pub status_timeout_ms: u64,

    /// Consecutive transient status failures tolerated before giving up.
    #[serde(default = "default_max_status_retries")]
    pub max_status_retries: u32,

    /// `max_events` passed to the event source per request.
    #[serde(default = "default_event_batch_size")]
    pub event_batch_size: u32,

    #[serde(default)]
    pub task_output_filter: TaskStatusFilter,
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_completion_poll_interval_ms() -> u64 {
    5000
}

fn default_progress_reporting() -> bool {
    true
}

fn default_status_timeout_ms() -> u64 {
    10_000
}

fn default_max_status_retries() -> u32 {
    5
}

fn default_event_batch_size() -> u32 {
    10
}

impl Default for MonitorSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            completion_poll_interval_ms: default_completion_poll_interval_ms(),
            progress_reporting: default_progress_reporting(),
            status_timeout_ms: default_status_timeout_ms(),
            max_status_retries: default_max_status_retries(),
            event_batch_size: default_event_batch_size(),
            task_output_filter: TaskStatusFilter::default(),
        }
    }
}

/// Validated configuration.
///
/// Only obtainable through `TryFrom<RawConfigFile>` (see `validate.rs`) or
/// [`ConfigFile::default`].
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub monitor: MonitorSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(monitor: MonitorSection) -> Self {
        Self { monitor }
    }
}

impl MonitorSection {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn completion_poll_interval(&self) -> Duration {
        Duration::from_millis(self.completion_poll_interval_ms)
    }

    pub fn status_timeout(&self) -> Duration {
        Duration::from_millis(self.status_timeout_ms)
    }
}
