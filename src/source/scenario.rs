// src/source/scenario.rs

//! TOML scenario files describing a scripted job.
//!
//! ```toml
//! [job]
//! id = "job_000_0001"
//! user = "tmp-user"
//! priority = "HIGH"
//!
//! [[poll]]
//! map = 1.0
//! reduce = 0.1
//! state = "RUNNING"
//! uber = true
//!
//! [[poll]]
//! error = "transient"
//! message = "connection reset"
//!
//! [[event]]
//! attempt = "attempt_000_0001_m_000000_0"
//! status = "FAILED"
//! is_map = true
//! ```
//!
//! Each `[[poll]]` entry answers one status request, in order. Entries carry
//! either a snapshot (`state` plus optional progress fields) or an `error`.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::errors::{JobmonError, Result, SourceError};
use crate::types::{
    JobId, JobPriority, JobState, JobStatus, TaskCompletionEvent, TaskCompletionStatus,
};

use super::scripted::{ScriptedEventSource, ScriptedStatusSource};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioFile {
    pub job: ScenarioJob,

    #[serde(default)]
    pub poll: Vec<ScenarioPoll>,

    #[serde(default)]
    pub event: Vec<ScenarioEvent>,
}

/// `[job]`: identity and metadata shared by every snapshot.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioJob {
    pub id: JobId,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub queue: String,
    #[serde(default)]
    pub job_file: String,
    #[serde(default)]
    pub tracking_url: String,
    #[serde(default)]
    pub priority: JobPriority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PollErrorKind {
    Transient,
    Permanent,
}

/// One `[[poll]]` entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioPoll {
    pub state: Option<JobState>,
    pub map: Option<f32>,
    pub reduce: Option<f32>,
    pub setup: Option<f32>,
    pub cleanup: Option<f32>,
    pub uber: Option<bool>,
    pub failure_info: Option<String>,
    pub error: Option<PollErrorKind>,
    pub message: Option<String>,
}

/// One `[[event]]` entry. Event ids follow file order.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioEvent {
    pub attempt: String,
    pub status: TaskCompletionStatus,
    #[serde(default)]
    pub is_map: bool,
    #[serde(default)]
    pub tracker_http: String,
}

/// A scenario turned into ready-to-use sources.
#[derive(Debug)]
pub struct Scenario {
    pub job_id: JobId,
    pub status: ScriptedStatusSource,
    pub events: ScriptedEventSource,
}

pub fn load_scenario(path: impl AsRef<Path>) -> Result<Scenario> {
    let contents = fs::read_to_string(path.as_ref())?;
    parse_scenario(&contents)
}

pub fn parse_scenario(contents: &str) -> Result<Scenario> {
    let file: ScenarioFile = toml::from_str(contents)?;
    Scenario::try_from(file)
}

impl TryFrom<ScenarioFile> for Scenario {
    type Error = JobmonError;

    fn try_from(file: ScenarioFile) -> std::result::Result<Self, Self::Error> {
        if !file.poll.iter().any(|p| p.error.is_none()) {
            return Err(JobmonError::ScenarioError(
                "scenario needs at least one [[poll]] entry with a snapshot".to_string(),
            ));
        }

        let answers = file
            .poll
            .iter()
            .enumerate()
            .map(|(index, poll)| poll_answer(&file.job, index, poll))
            .collect::<Result<Vec<_>>>()?;

        let events = file
            .event
            .into_iter()
            .enumerate()
            .map(|(index, e)| TaskCompletionEvent {
                event_id: index as u32,
                attempt_id: e.attempt,
                is_map: e.is_map,
                status: e.status,
                tracker_http: e.tracker_http,
            });

        Ok(Scenario {
            job_id: file.job.id,
            status: ScriptedStatusSource::new(answers),
            events: ScriptedEventSource::new(events),
        })
    }
}

fn poll_answer(
    job: &ScenarioJob,
    index: usize,
    poll: &ScenarioPoll,
) -> Result<std::result::Result<JobStatus, SourceError>> {
    let at = |msg: &str| JobmonError::ScenarioError(format!("[[poll]] #{}: {msg}", index + 1));

    if let Some(kind) = poll.error {
        let has_snapshot_fields = poll.state.is_some()
            || poll.map.is_some()
            || poll.reduce.is_some()
            || poll.setup.is_some()
            || poll.cleanup.is_some()
            || poll.uber.is_some()
            || poll.failure_info.is_some();
        if has_snapshot_fields {
            return Err(at("an error entry cannot also carry snapshot fields"));
        }

        let message = poll
            .message
            .clone()
            .unwrap_or_else(|| "scripted failure".to_string());
        let err = match kind {
            PollErrorKind::Transient => SourceError::Transient(message),
            PollErrorKind::Permanent => SourceError::Permanent(message),
        };
        return Ok(Err(err));
    }

    if poll.message.is_some() {
        return Err(at("`message` is only valid together with `error`"));
    }

    let state = poll.state.ok_or_else(|| at("missing `state`"))?;

    let mut status = JobStatus::new(job.id.clone());
    status.state = state;
    status.priority = job.priority;
    status.user = job.user.clone();
    status.name = job.name.clone();
    status.queue = job.queue.clone();
    status.job_file = job.job_file.clone();
    status.tracking_url = job.tracking_url.clone();
    status.map_progress = progress(poll.map, "map").map_err(|m| at(m.as_str()))?;
    status.reduce_progress = progress(poll.reduce, "reduce").map_err(|m| at(m.as_str()))?;
    status.setup_progress = progress(poll.setup, "setup").map_err(|m| at(m.as_str()))?;
    status.cleanup_progress = progress(poll.cleanup, "cleanup").map_err(|m| at(m.as_str()))?;
    status.is_uber = poll.uber.unwrap_or(false);
    status.failure_info = poll.failure_info.clone();

    Ok(Ok(status))
}

fn progress(value: Option<f32>, field: &str) -> std::result::Result<f32, String> {
    let value = value.unwrap_or(0.0);
    if !(0.0..=1.0).contains(&value) {
        return Err(format!("`{field}` must be within [0, 1] (got {value})"));
    }
    Ok(value)
}
