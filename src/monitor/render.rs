// src/monitor/render.rs

//! Text rendering of job reports.
//!
//! Every function here is pure: the same input always gives the same line.
//! The monitor relies on that for deduplication, since it compares rendered
//! lines rather than raw progress values.

use crate::errors::SourceError;
use crate::types::{JobId, JobState, JobStatus, TaskCompletionEvent};

/// Absorbs f32 representation error so that e.g. `0.29` renders as 29%.
const PERCENT_EPSILON: f64 = 1e-6;

/// Integer percentage of a progress fraction: floored, clamped to `0..=100`.
/// Non-finite input renders as 0.
pub fn percent(progress: f32) -> u8 {
    if !progress.is_finite() {
        return 0;
    }
    let scaled = (f64::from(progress) * 100.0 + PERCENT_EPSILON).floor();
    scaled.clamp(0.0, 100.0) as u8
}

/// `map <M>% reduce <R>%`
pub fn render_progress(status: &JobStatus) -> String {
    format!(
        "map {}% reduce {}%",
        percent(status.map_progress),
        percent(status.reduce_progress)
    )
}

pub fn render_header(job_id: &JobId) -> String {
    format!("Running job: {job_id}")
}

pub fn render_uber(status: &JobStatus) -> String {
    format!(
        "Job {} running in uber mode : {}",
        status.job_id, status.is_uber
    )
}

pub fn render_task_event(event: &TaskCompletionEvent) -> String {
    format!("Task Id : {}, Status : {}", event.attempt_id, event.status)
}

/// Closing line for a job that reached a terminal state.
pub fn render_summary(status: &JobStatus) -> String {
    match status.state {
        JobState::Succeeded => format!("Job {} completed successfully", status.job_id),
        state => {
            let mut line = format!("Job {} failed with state {}", status.job_id, state);
            if let Some(info) = status.failure_info.as_deref().filter(|s| !s.is_empty()) {
                line.push_str(" due to: ");
                line.push_str(info);
            }
            line
        }
    }
}

/// Closing line when the monitor gives up on the status source.
pub fn render_abort(job_id: &JobId, last_state: Option<JobState>, err: &SourceError) -> String {
    let state = last_state.map_or("UNKNOWN", JobState::as_str);
    format!("Job {job_id} monitoring aborted with last observed state {state}: {err}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaskCompletionStatus;

    fn status(map: f32, reduce: f32, state: JobState) -> JobStatus {
        let mut s = JobStatus::new(JobId::new("000", 1));
        s.map_progress = map;
        s.reduce_progress = reduce;
        s.state = state;
        s
    }

    #[test]
    fn percent_floors_and_clamps() {
        assert_eq!(percent(0.0), 0);
        assert_eq!(percent(0.1), 10);
        assert_eq!(percent(0.29), 29);
        assert_eq!(percent(0.999), 99);
        assert_eq!(percent(1.0), 100);
        assert_eq!(percent(1.7), 100);
        assert_eq!(percent(-0.3), 0);
        assert_eq!(percent(f32::NAN), 0);
        assert_eq!(percent(f32::INFINITY), 0);
    }

    #[test]
    fn progress_line_shows_map_and_reduce() {
        let line = render_progress(&status(1.0, 0.1, JobState::Running));
        assert_eq!(line, "map 100% reduce 10%");
    }

    #[test]
    fn progress_line_ignores_setup_and_cleanup() {
        let mut a = status(0.5, 0.0, JobState::Running);
        let mut b = a.clone();
        a.setup_progress = 0.2;
        b.setup_progress = 1.0;
        b.cleanup_progress = 0.4;
        assert_eq!(render_progress(&a), render_progress(&b));
    }

    #[test]
    fn uber_line_names_the_job() {
        let mut s = status(0.0, 0.0, JobState::Running);
        s.is_uber = true;
        assert_eq!(render_uber(&s), "Job job_000_0001 running in uber mode : true");
    }

    #[test]
    fn summary_for_each_terminal_state() {
        assert_eq!(
            render_summary(&status(1.0, 1.0, JobState::Succeeded)),
            "Job job_000_0001 completed successfully"
        );
        assert_eq!(
            render_summary(&status(1.0, 0.4, JobState::Killed)),
            "Job job_000_0001 failed with state KILLED"
        );

        let mut failed = status(1.0, 0.4, JobState::Failed);
        failed.failure_info = Some("Task failed task_000_0001_r_000000".to_string());
        assert_eq!(
            render_summary(&failed),
            "Job job_000_0001 failed with state FAILED due to: Task failed task_000_0001_r_000000"
        );
    }

    #[test]
    fn abort_line_reports_last_state() {
        let id = JobId::new("000", 1);
        let err = SourceError::Permanent("no such job".to_string());

        assert_eq!(
            render_abort(&id, Some(JobState::Running), &err),
            "Job job_000_0001 monitoring aborted with last observed state RUNNING: permanent source error: no such job"
        );
        assert!(render_abort(&id, None, &err).contains("state UNKNOWN"));
    }

    #[test]
    fn task_event_line() {
        let event = TaskCompletionEvent {
            event_id: 3,
            attempt_id: "attempt_000_0001_m_000003_1".to_string(),
            is_map: true,
            status: TaskCompletionStatus::Failed,
            tracker_http: String::new(),
        };
        assert_eq!(
            render_task_event(&event),
            "Task Id : attempt_000_0001_m_000003_1, Status : FAILED"
        );
    }
}
