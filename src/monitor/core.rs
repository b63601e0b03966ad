// src/monitor/core.rs

//! Pure monitor state machine.
//!
//! [`MonitorCore`] consumes one [`MonitorEvent`] per status poll and answers
//! with a [`CoreStep`]: the lines to append to the transcript, in order, and
//! whether to poll again or stop. It owns the per-run state (last printed
//! progress line, whether uber mode was announced, retry counter) and does no
//! IO, so it can be tested without Tokio, sources or sinks.

use std::time::Duration;

use tracing::{debug, warn};

use crate::errors::SourceError;
use crate::types::{JobId, JobState, JobStatus, TaskCompletionEvent};

use super::render::{
    render_abort, render_header, render_progress, render_summary, render_task_event,
    render_uber,
};
use super::{MonitorOptions, MonitorOutcome};

/// Result of one status poll, as seen by the core.
#[derive(Debug, Clone)]
pub enum MonitorEvent {
    /// A snapshot arrived, together with any task events drained after it.
    Polled {
        status: JobStatus,
        events: Vec<TaskCompletionEvent>,
    },
    /// The status request failed (timeouts arrive here as transient errors).
    PollFailed(SourceError),
}

/// What the shell should do after writing the step's lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextAction {
    PollAfter(Duration),
    Finish(MonitorOutcome),
}

#[derive(Debug, Clone)]
pub struct CoreStep {
    pub lines: Vec<String>,
    pub next: NextAction,
}

#[derive(Debug)]
pub struct MonitorCore {
    job_id: JobId,
    options: MonitorOptions,
    last_rendered_line: Option<String>,
    uber_announced: bool,
    last_state: Option<JobState>,
    consecutive_failures: u32,
    next_event_index: u32,
    outcome: Option<MonitorOutcome>,
}

impl MonitorCore {
    pub fn new(job_id: JobId, options: MonitorOptions) -> Self {
        Self {
            job_id,
            options,
            last_rendered_line: None,
            uber_announced: false,
            last_state: None,
            consecutive_failures: 0,
            next_event_index: 0,
            outcome: None,
        }
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    /// Index of the first task event not yet seen.
    pub fn next_event_index(&self) -> u32 {
        self.next_event_index
    }

    pub fn last_state(&self) -> Option<JobState> {
        self.last_state
    }

    /// Lines to print before the first poll.
    pub fn start(&self) -> Vec<String> {
        if self.options.progress_reporting {
            vec![render_header(&self.job_id)]
        } else {
            Vec::new()
        }
    }

    pub fn step(&mut self, event: MonitorEvent) -> CoreStep {
        if let Some(outcome) = self.outcome {
            return CoreStep {
                lines: Vec::new(),
                next: NextAction::Finish(outcome),
            };
        }

        match event {
            MonitorEvent::Polled { status, events } => self.handle_status(status, events),
            MonitorEvent::PollFailed(err) => self.handle_failure(err),
        }
    }

    /// Line order for one snapshot: uber announcement, task events, progress,
    /// then the summary if the job is done. The summary therefore always
    /// directly follows the progress line of the terminal snapshot.
    fn handle_status(&mut self, status: JobStatus, events: Vec<TaskCompletionEvent>) -> CoreStep {
        let mut lines = Vec::new();

        self.consecutive_failures = 0;
        self.last_state = Some(status.state);
        self.next_event_index = self
            .next_event_index
            .saturating_add(u32::try_from(events.len()).unwrap_or(u32::MAX));

        if self.options.progress_reporting {
            if status.is_uber && !self.uber_announced {
                self.uber_announced = true;
                lines.push(render_uber(&status));
            }

            let filter = self.options.task_output_filter;
            lines.extend(
                events
                    .iter()
                    .filter(|e| filter.accepts(e.status))
                    .map(render_task_event),
            );

            // A terminal frame must sit directly above the summary, so it is
            // repeated when event or uber lines were written since the last
            // identical report.
            let report = render_progress(&status);
            let changed = self.last_rendered_line.as_deref() != Some(report.as_str());
            if changed || (status.is_complete() && !lines.is_empty()) {
                lines.push(report.clone());
                self.last_rendered_line = Some(report);
            }
        }

        if !status.is_complete() {
            return CoreStep {
                lines,
                next: NextAction::PollAfter(self.options.interval()),
            };
        }

        lines.push(render_summary(&status));
        let outcome = if status.is_successful() {
            MonitorOutcome::Succeeded
        } else {
            MonitorOutcome::Failed(status.state)
        };
        self.finish(lines, outcome)
    }

    fn handle_failure(&mut self, err: SourceError) -> CoreStep {
        if err.is_transient() {
            self.consecutive_failures += 1;
            if self.consecutive_failures <= self.options.max_status_retries {
                debug!(
                    job = %self.job_id,
                    attempt = self.consecutive_failures,
                    max_retries = self.options.max_status_retries,
                    error = %err,
                    "status poll failed; will retry"
                );
                return CoreStep {
                    lines: Vec::new(),
                    next: NextAction::PollAfter(self.options.interval()),
                };
            }
            warn!(
                job = %self.job_id,
                failures = self.consecutive_failures,
                "status poll retry budget exhausted"
            );
        }

        let lines = vec![render_abort(&self.job_id, self.last_state, &err)];
        let outcome = MonitorOutcome::Aborted {
            last_state: self.last_state,
        };
        self.finish(lines, outcome)
    }

    fn finish(&mut self, lines: Vec<String>, outcome: MonitorOutcome) -> CoreStep {
        self.outcome = Some(outcome);
        CoreStep {
            lines,
            next: NextAction::Finish(outcome),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TaskCompletionStatus, TaskStatusFilter};

    fn job_id() -> JobId {
        JobId::new("000", 1)
    }

    fn snapshot(map: f32, reduce: f32, state: JobState, uber: bool) -> JobStatus {
        let mut s = JobStatus::new(job_id());
        s.map_progress = map;
        s.reduce_progress = reduce;
        s.state = state;
        s.is_uber = uber;
        s
    }

    fn polled(status: JobStatus) -> MonitorEvent {
        MonitorEvent::Polled {
            status,
            events: Vec::new(),
        }
    }

    fn core() -> MonitorCore {
        MonitorCore::new(job_id(), MonitorOptions::default())
    }

    #[test]
    fn header_names_the_job() {
        assert_eq!(core().start(), vec!["Running job: job_000_0001".to_string()]);
    }

    #[test]
    fn running_snapshot_polls_again_after_interval() {
        let mut core = core();
        let step = core.step(polled(snapshot(0.5, 0.0, JobState::Running, false)));

        assert_eq!(step.lines, vec!["map 50% reduce 0%".to_string()]);
        assert_eq!(step.next, NextAction::PollAfter(Duration::from_millis(1000)));
    }

    #[test]
    fn identical_snapshots_print_once() {
        let mut core = core();
        let s = snapshot(1.0, 0.1, JobState::Running, false);

        let first = core.step(polled(s.clone()));
        let second = core.step(polled(s.clone()));
        let third = core.step(polled(s));

        assert_eq!(first.lines.len(), 1);
        assert!(second.lines.is_empty());
        assert!(third.lines.is_empty());
    }

    #[test]
    fn uber_is_announced_once_before_progress() {
        let mut core = core();

        let first = core.step(polled(snapshot(1.0, 0.1, JobState::Running, true)));
        let second = core.step(polled(snapshot(1.0, 1.0, JobState::Succeeded, true)));

        assert_eq!(
            first.lines,
            vec![
                "Job job_000_0001 running in uber mode : true".to_string(),
                "map 100% reduce 10%".to_string(),
            ]
        );
        assert_eq!(
            second.lines,
            vec![
                "map 100% reduce 100%".to_string(),
                "Job job_000_0001 completed successfully".to_string(),
            ]
        );
        assert_eq!(second.next, NextAction::Finish(MonitorOutcome::Succeeded));
    }

    #[test]
    fn uber_seen_late_is_announced_late() {
        let mut core = core();

        let first = core.step(polled(snapshot(0.2, 0.0, JobState::Running, false)));
        let second = core.step(polled(snapshot(0.4, 0.0, JobState::Running, true)));

        assert_eq!(first.lines, vec!["map 20% reduce 0%".to_string()]);
        assert_eq!(second.lines[0], "Job job_000_0001 running in uber mode : true");
        assert_eq!(second.lines[1], "map 40% reduce 0%");
    }

    #[test]
    fn terminal_first_snapshot_still_prints_progress() {
        let mut core = core();
        let step = core.step(polled(snapshot(1.0, 1.0, JobState::Succeeded, false)));

        assert_eq!(
            step.lines,
            vec![
                "map 100% reduce 100%".to_string(),
                "Job job_000_0001 completed successfully".to_string(),
            ]
        );
    }

    #[test]
    fn terminal_snapshot_equal_to_previous_line_is_not_repeated() {
        let mut core = core();
        core.step(polled(snapshot(1.0, 1.0, JobState::Running, false)));
        let step = core.step(polled(snapshot(1.0, 1.0, JobState::Succeeded, false)));

        assert_eq!(
            step.lines,
            vec!["Job job_000_0001 completed successfully".to_string()]
        );
    }

    #[test]
    fn terminal_report_is_repeated_after_late_task_events() {
        let mut core = core();
        core.step(polled(snapshot(1.0, 1.0, JobState::Running, false)));

        let step = core.step(MonitorEvent::Polled {
            status: snapshot(1.0, 1.0, JobState::Succeeded, false),
            events: vec![TaskCompletionEvent {
                event_id: 0,
                attempt_id: "attempt_000_0001_r_000000_0".to_string(),
                is_map: false,
                status: TaskCompletionStatus::Failed,
                tracker_http: String::new(),
            }],
        });

        assert_eq!(
            step.lines,
            vec![
                "Task Id : attempt_000_0001_r_000000_0, Status : FAILED".to_string(),
                "map 100% reduce 100%".to_string(),
                "Job job_000_0001 completed successfully".to_string(),
            ]
        );
    }

    #[test]
    fn late_uber_notice_on_terminal_frame_keeps_report_last() {
        let mut core = core();
        core.step(polled(snapshot(1.0, 1.0, JobState::Running, false)));
        let step = core.step(polled(snapshot(1.0, 1.0, JobState::Succeeded, true)));

        assert_eq!(
            step.lines,
            vec![
                "Job job_000_0001 running in uber mode : true".to_string(),
                "map 100% reduce 100%".to_string(),
                "Job job_000_0001 completed successfully".to_string(),
            ]
        );
    }

    #[test]
    fn non_terminal_duplicate_stays_suppressed_after_events() {
        let mut options = MonitorOptions::default();
        options.task_output_filter = TaskStatusFilter::All;
        let mut core = MonitorCore::new(job_id(), options);
        core.step(polled(snapshot(0.5, 0.0, JobState::Running, false)));

        let step = core.step(MonitorEvent::Polled {
            status: snapshot(0.5, 0.0, JobState::Running, false),
            events: vec![TaskCompletionEvent {
                event_id: 0,
                attempt_id: "attempt_000_0001_m_000000_0".to_string(),
                is_map: true,
                status: TaskCompletionStatus::Succeeded,
                tracker_http: String::new(),
            }],
        });

        assert_eq!(
            step.lines,
            vec!["Task Id : attempt_000_0001_m_000000_0, Status : SUCCEEDED".to_string()]
        );
    }

    #[test]
    fn failed_job_ends_with_failure_summary() {
        let mut core = core();
        let step = core.step(polled(snapshot(1.0, 0.3, JobState::Failed, false)));

        assert_eq!(
            step.lines.last().map(String::as_str),
            Some("Job job_000_0001 failed with state FAILED")
        );
        assert_eq!(
            step.next,
            NextAction::Finish(MonitorOutcome::Failed(JobState::Failed))
        );
    }

    #[test]
    fn transient_failures_within_budget_are_retried() {
        let mut options = MonitorOptions::default();
        options.max_status_retries = 2;
        let mut core = MonitorCore::new(job_id(), options);
        let err = SourceError::Transient("timeout".to_string());

        for _ in 0..2 {
            let step = core.step(MonitorEvent::PollFailed(err.clone()));
            assert!(step.lines.is_empty());
            assert!(matches!(step.next, NextAction::PollAfter(_)));
        }

        let step = core.step(MonitorEvent::PollFailed(err));
        assert_eq!(step.lines.len(), 1);
        assert!(step.lines[0].contains("monitoring aborted"));
        assert_eq!(
            step.next,
            NextAction::Finish(MonitorOutcome::Aborted { last_state: None })
        );
    }

    #[test]
    fn successful_poll_resets_retry_budget() {
        let mut options = MonitorOptions::default();
        options.max_status_retries = 1;
        let mut core = MonitorCore::new(job_id(), options);
        let err = SourceError::Transient("timeout".to_string());

        core.step(MonitorEvent::PollFailed(err.clone()));
        core.step(polled(snapshot(0.1, 0.0, JobState::Running, false)));
        let step = core.step(MonitorEvent::PollFailed(err));

        assert!(matches!(step.next, NextAction::PollAfter(_)));
    }

    #[test]
    fn permanent_failure_aborts_with_last_state() {
        let mut core = core();
        core.step(polled(snapshot(0.1, 0.0, JobState::Running, false)));
        let step = core.step(MonitorEvent::PollFailed(SourceError::Permanent(
            "job not found".to_string(),
        )));

        assert_eq!(
            step.lines,
            vec![
                "Job job_000_0001 monitoring aborted with last observed state RUNNING: permanent source error: job not found"
                    .to_string()
            ]
        );
        assert_eq!(
            step.next,
            NextAction::Finish(MonitorOutcome::Aborted {
                last_state: Some(JobState::Running)
            })
        );
    }

    #[test]
    fn failed_task_events_precede_progress_line() {
        let mut core = core();
        let events = vec![
            TaskCompletionEvent {
                event_id: 0,
                attempt_id: "attempt_000_0001_m_000000_0".to_string(),
                is_map: true,
                status: TaskCompletionStatus::Succeeded,
                tracker_http: String::new(),
            },
            TaskCompletionEvent {
                event_id: 1,
                attempt_id: "attempt_000_0001_m_000001_0".to_string(),
                is_map: true,
                status: TaskCompletionStatus::Failed,
                tracker_http: String::new(),
            },
        ];

        let step = core.step(MonitorEvent::Polled {
            status: snapshot(1.0, 1.0, JobState::Succeeded, false),
            events,
        });

        assert_eq!(
            step.lines,
            vec![
                "Task Id : attempt_000_0001_m_000001_0, Status : FAILED".to_string(),
                "map 100% reduce 100%".to_string(),
                "Job job_000_0001 completed successfully".to_string(),
            ]
        );
        assert_eq!(core.next_event_index(), 2);
    }

    #[test]
    fn all_filter_prints_every_event() {
        let mut options = MonitorOptions::default();
        options.task_output_filter = TaskStatusFilter::All;
        let mut core = MonitorCore::new(job_id(), options);
        let event = TaskCompletionEvent {
            event_id: 0,
            attempt_id: "attempt_000_0001_r_000000_0".to_string(),
            is_map: false,
            status: TaskCompletionStatus::Succeeded,
            tracker_http: String::new(),
        };

        let step = core.step(MonitorEvent::Polled {
            status: snapshot(1.0, 0.5, JobState::Running, false),
            events: vec![event],
        });
        assert_eq!(step.lines.len(), 2);
    }

    #[test]
    fn quiet_mode_prints_only_summary_and_uses_completion_interval() {
        let mut options = MonitorOptions::default();
        options.progress_reporting = false;
        let mut core = MonitorCore::new(job_id(), options);

        assert!(core.start().is_empty());

        let running = core.step(polled(snapshot(0.5, 0.0, JobState::Running, true)));
        assert!(running.lines.is_empty());
        assert_eq!(
            running.next,
            NextAction::PollAfter(Duration::from_millis(5000))
        );

        let done = core.step(polled(snapshot(1.0, 1.0, JobState::Succeeded, true)));
        assert_eq!(
            done.lines,
            vec!["Job job_000_0001 completed successfully".to_string()]
        );
    }

    #[test]
    fn steps_after_finish_are_inert() {
        let mut core = core();
        core.step(polled(snapshot(1.0, 1.0, JobState::Killed, false)));
        let again = core.step(polled(snapshot(1.0, 1.0, JobState::Succeeded, false)));

        assert!(again.lines.is_empty());
        assert_eq!(
            again.next,
            NextAction::Finish(MonitorOutcome::Failed(JobState::Killed))
        );
    }
}
