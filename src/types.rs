// src/types.rs

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::errors::JobmonError;

/// Identifier of a job on the cluster.
///
/// Rendered as `job_<tracker>_<id>`, with the numeric part zero-padded to at
/// least four digits (`job_000_0001`). Parsing only accepts that canonical
/// form, so text round-trips exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct JobId {
    tracker: String,
    id: u32,
}

impl JobId {
    pub fn new(tracker: impl Into<String>, id: u32) -> Self {
        Self {
            tracker: tracker.into(),
            id,
        }
    }

    pub fn tracker(&self) -> &str {
        &self.tracker
    }

    pub fn id(&self) -> u32 {
        self.id
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job_{}_{:04}", self.tracker, self.id)
    }
}

impl FromStr for JobId {
    type Err = JobmonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            JobmonError::InvalidJobId(format!(
                "{s:?} (expected \"job_<tracker>_<nnnn>\")"
            ))
        };

        let rest = s.strip_prefix("job_").ok_or_else(invalid)?;
        let (tracker, digits) = rest.rsplit_once('_').ok_or_else(invalid)?;
        if tracker.is_empty() {
            return Err(invalid());
        }
        let id = digits.parse::<u32>().map_err(|_| invalid())?;
        // `01` or `+0001` would display differently than they were written.
        if format!("{id:04}") != digits {
            return Err(invalid());
        }

        Ok(JobId::new(tracker, id))
    }
}

impl TryFrom<String> for JobId {
    type Error = JobmonError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Lifecycle state of a job as reported by the status service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    /// Submitted but not yet running.
    Prep,
    Running,
    Succeeded,
    Failed,
    Killed,
}

impl JobState {
    /// SUCCEEDED, FAILED and KILLED are absorbing.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobState::Succeeded | JobState::Failed | JobState::Killed
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobState::Prep => "PREP",
            JobState::Running => "RUNNING",
            JobState::Succeeded => "SUCCEEDED",
            JobState::Failed => "FAILED",
            JobState::Killed => "KILLED",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobPriority {
    VeryHigh,
    High,
    #[default]
    Normal,
    Low,
    VeryLow,
}

/// Immutable snapshot of a job, as returned by one status poll.
#[derive(Debug, Clone, PartialEq)]
pub struct JobStatus {
    pub job_id: JobId,
    pub map_progress: f32,
    pub reduce_progress: f32,
    pub setup_progress: f32,
    pub cleanup_progress: f32,
    pub state: JobState,
    pub priority: JobPriority,
    pub user: String,
    pub name: String,
    pub queue: String,
    pub job_file: String,
    pub tracking_url: String,
    pub is_uber: bool,
    /// Diagnostic text the service attaches to failed or killed jobs.
    pub failure_info: Option<String>,
}

impl JobStatus {
    /// A freshly submitted job: no progress, `PREP` state, empty metadata.
    pub fn new(job_id: JobId) -> Self {
        Self {
            job_id,
            map_progress: 0.0,
            reduce_progress: 0.0,
            setup_progress: 0.0,
            cleanup_progress: 0.0,
            state: JobState::Prep,
            priority: JobPriority::default(),
            user: String::new(),
            name: String::new(),
            queue: String::new(),
            job_file: String::new(),
            tracking_url: String::new(),
            is_uber: false,
            failure_info: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn is_successful(&self) -> bool {
        self.state == JobState::Succeeded
    }
}

/// Final status of one task attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskCompletionStatus {
    Failed,
    Killed,
    Succeeded,
    Obsolete,
    /// The task (not just this attempt) has failed for good.
    Tipfailed,
}

impl fmt::Display for TaskCompletionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskCompletionStatus::Failed => "FAILED",
            TaskCompletionStatus::Killed => "KILLED",
            TaskCompletionStatus::Succeeded => "SUCCEEDED",
            TaskCompletionStatus::Obsolete => "OBSOLETE",
            TaskCompletionStatus::Tipfailed => "TIPFAILED",
        };
        f.write_str(s)
    }
}

/// A task attempt finished; replayed to the client by index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCompletionEvent {
    pub event_id: u32,
    pub attempt_id: String,
    pub is_map: bool,
    pub status: TaskCompletionStatus,
    pub tracker_http: String,
}

/// Which task-completion events the monitor prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatusFilter {
    None,
    Killed,
    #[default]
    Failed,
    Succeeded,
    All,
}

impl TaskStatusFilter {
    pub fn accepts(self, status: TaskCompletionStatus) -> bool {
        match self {
            TaskStatusFilter::None => false,
            TaskStatusFilter::Killed => status == TaskCompletionStatus::Killed,
            TaskStatusFilter::Failed => matches!(
                status,
                TaskCompletionStatus::Failed | TaskCompletionStatus::Tipfailed
            ),
            TaskStatusFilter::Succeeded => status == TaskCompletionStatus::Succeeded,
            TaskStatusFilter::All => true,
        }
    }
}
