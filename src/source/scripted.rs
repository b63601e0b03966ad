// src/source/scripted.rs

//! Queue-backed sources that replay a prepared sequence of answers.

use std::collections::VecDeque;

use crate::errors::SourceError;
use crate::types::{JobId, JobStatus, TaskCompletionEvent};

use super::{EventSource, SourceFuture, StatusSource};

/// Status source that answers each poll with the next scripted result.
///
/// Once the script runs out, the last snapshot handed out is repeated. A
/// source that never produced a snapshot reports a permanent error instead.
#[derive(Debug, Clone, Default)]
pub struct ScriptedStatusSource {
    script: VecDeque<Result<JobStatus, SourceError>>,
    last: Option<JobStatus>,
    polls: usize,
}

impl ScriptedStatusSource {
    pub fn new(script: impl IntoIterator<Item = Result<JobStatus, SourceError>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            last: None,
            polls: 0,
        }
    }

    pub fn from_snapshots(snapshots: impl IntoIterator<Item = JobStatus>) -> Self {
        Self::new(snapshots.into_iter().map(Ok))
    }

    /// Number of status requests served so far.
    pub fn polls(&self) -> usize {
        self.polls
    }

    /// Scripted answers not yet handed out.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    fn next_answer(&mut self) -> Result<JobStatus, SourceError> {
        self.polls += 1;

        match self.script.pop_front() {
            Some(Ok(status)) => {
                self.last = Some(status.clone());
                Ok(status)
            }
            Some(Err(err)) => Err(err),
            None => self.last.clone().ok_or_else(|| {
                SourceError::Permanent("status script is empty".to_string())
            }),
        }
    }
}

impl StatusSource for ScriptedStatusSource {
    fn job_status<'a>(&'a mut self, job_id: &'a JobId) -> SourceFuture<'a, JobStatus> {
        let answer = self.next_answer().and_then(|status| {
            if &status.job_id == job_id {
                Ok(status)
            } else {
                Err(SourceError::Permanent(format!(
                    "scripted status is for {} but {} was requested",
                    status.job_id, job_id
                )))
            }
        });
        Box::pin(async move { answer })
    }
}

/// Event source serving a fixed list of events by index.
///
/// The first `failures` requests fail with the configured error, which lets
/// tests check that event errors never stop the monitor.
#[derive(Debug, Clone, Default)]
pub struct ScriptedEventSource {
    events: Vec<TaskCompletionEvent>,
    failures: VecDeque<SourceError>,
    requests: Vec<(u32, u32)>,
}

impl ScriptedEventSource {
    pub fn new(events: impl IntoIterator<Item = TaskCompletionEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
            failures: VecDeque::new(),
            requests: Vec::new(),
        }
    }

    /// Fail the next request with `err` (stackable).
    pub fn fail_next(mut self, err: SourceError) -> Self {
        self.failures.push_back(err);
        self
    }

    /// Every `(start_index, max_events)` pair requested so far.
    pub fn requests(&self) -> &[(u32, u32)] {
        &self.requests
    }

    fn slice(&self, start_index: u32, max_events: u32) -> Vec<TaskCompletionEvent> {
        let start = (start_index as usize).min(self.events.len());
        let end = start
            .saturating_add(max_events as usize)
            .min(self.events.len());
        self.events[start..end].to_vec()
    }
}

impl EventSource for ScriptedEventSource {
    fn task_completion_events<'a>(
        &'a mut self,
        _job_id: &'a JobId,
        start_index: u32,
        max_events: u32,
    ) -> SourceFuture<'a, Vec<TaskCompletionEvent>> {
        self.requests.push((start_index, max_events));

        let answer = match self.failures.pop_front() {
            Some(err) => Err(err),
            None => Ok(self.slice(start_index, max_events)),
        };
        Box::pin(async move { answer })
    }
}

/// Event source for jobs that never report task completions.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEvents;

impl EventSource for NoEvents {
    fn task_completion_events<'a>(
        &'a mut self,
        _job_id: &'a JobId,
        _start_index: u32,
        _max_events: u32,
    ) -> SourceFuture<'a, Vec<TaskCompletionEvent>> {
        Box::pin(async { Ok(Vec::new()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{JobState, TaskCompletionStatus};

    fn status(state: JobState) -> JobStatus {
        let mut s = JobStatus::new(JobId::new("000", 1));
        s.state = state;
        s
    }

    fn event(id: u32) -> TaskCompletionEvent {
        TaskCompletionEvent {
            event_id: id,
            attempt_id: format!("attempt_000_0001_m_{id:06}_0"),
            is_map: true,
            status: TaskCompletionStatus::Succeeded,
            tracker_http: String::new(),
        }
    }

    #[tokio::test]
    async fn repeats_last_snapshot_when_exhausted() {
        let id = JobId::new("000", 1);
        let mut source = ScriptedStatusSource::from_snapshots([
            status(JobState::Running),
            status(JobState::Succeeded),
        ]);

        assert_eq!(source.job_status(&id).await.unwrap().state, JobState::Running);
        assert_eq!(source.job_status(&id).await.unwrap().state, JobState::Succeeded);
        assert_eq!(source.job_status(&id).await.unwrap().state, JobState::Succeeded);
        assert_eq!(source.polls(), 3);
    }

    #[tokio::test]
    async fn empty_script_is_a_permanent_error() {
        let id = JobId::new("000", 1);
        let mut source = ScriptedStatusSource::default();

        let err = source.job_status(&id).await.unwrap_err();
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn rejects_requests_for_another_job() {
        let mut source = ScriptedStatusSource::from_snapshots([status(JobState::Running)]);
        let other = JobId::new("999", 7);

        assert!(matches!(
            source.job_status(&other).await,
            Err(SourceError::Permanent(_))
        ));
    }

    #[tokio::test]
    async fn serves_events_in_batches() {
        let id = JobId::new("000", 1);
        let mut source = ScriptedEventSource::new((0..5).map(event));

        let first = source.task_completion_events(&id, 0, 3).await.unwrap();
        let second = source.task_completion_events(&id, 3, 3).await.unwrap();
        let third = source.task_completion_events(&id, 5, 3).await.unwrap();

        assert_eq!(first.len(), 3);
        assert_eq!(second.iter().map(|e| e.event_id).collect::<Vec<_>>(), vec![3, 4]);
        assert!(third.is_empty());
        assert_eq!(source.requests(), &[(0, 3), (3, 3), (5, 3)]);
    }
}
