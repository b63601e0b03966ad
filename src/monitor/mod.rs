// src/monitor/mod.rs

//! Job progress monitor.
//!
//! - [`core`] holds the pure state machine: it turns poll results into the
//!   lines to print and the next thing to do. No Tokio, no IO.
//! - [`runtime`] is the async shell around it: it talks to the sources,
//!   writes to the sink, sleeps between polls and honours cancellation.
//! - [`render`] formats the individual report lines.

use std::time::Duration;

use crate::config::{ConfigFile, MonitorSection};
use crate::types::{JobState, TaskStatusFilter};

pub mod core;
pub mod render;
pub mod runtime;

pub use self::core::{CoreStep, MonitorCore, MonitorEvent, NextAction};
pub use runtime::JobMonitor;

/// How a monitoring run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorOutcome {
    /// The job reached SUCCEEDED.
    Succeeded,
    /// The job reached FAILED or KILLED.
    Failed(JobState),
    /// The status source failed permanently or too often in a row.
    Aborted { last_state: Option<JobState> },
    /// Cancelled from outside; no summary was written.
    Cancelled,
}

impl MonitorOutcome {
    pub fn is_success(self) -> bool {
        self == MonitorOutcome::Succeeded
    }
}

/// Tunables for one monitoring run, derived from the `[monitor]` section.
#[derive(Debug, Clone)]
pub struct MonitorOptions {
    pub poll_interval: Duration,
    /// Used instead of `poll_interval` when progress reporting is off.
    pub completion_poll_interval: Duration,
    pub progress_reporting: bool,
    pub status_timeout: Duration,
    pub max_status_retries: u32,
    pub event_batch_size: u32,
    pub task_output_filter: TaskStatusFilter,
}

impl MonitorOptions {
    /// Delay to wait before the next status poll.
    pub fn interval(&self) -> Duration {
        if self.progress_reporting {
            self.poll_interval
        } else {
            self.completion_poll_interval
        }
    }
}

impl From<&MonitorSection> for MonitorOptions {
    fn from(section: &MonitorSection) -> Self {
        Self {
            poll_interval: section.poll_interval(),
            completion_poll_interval: section.completion_poll_interval(),
            progress_reporting: section.progress_reporting,
            status_timeout: section.status_timeout(),
            max_status_retries: section.max_status_retries,
            event_batch_size: section.event_batch_size.max(1),
            task_output_filter: section.task_output_filter,
        }
    }
}

impl From<&ConfigFile> for MonitorOptions {
    fn from(cfg: &ConfigFile) -> Self {
        Self::from(&cfg.monitor)
    }
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self::from(&MonitorSection::default())
    }
}
