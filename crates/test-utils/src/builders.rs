use jobmon::types::{JobId, JobPriority, JobState, JobStatus, TaskCompletionEvent, TaskCompletionStatus};

/// The job every test talks about: `job_000_0001`.
pub fn test_job_id() -> JobId {
    JobId::new("000", 1)
}

/// Builder for `JobStatus` snapshots, pre-filled with the metadata of a
/// small test job.
#[derive(Debug, Clone)]
pub struct JobStatusBuilder {
    status: JobStatus,
}

impl JobStatusBuilder {
    pub fn new() -> Self {
        let mut status = JobStatus::new(test_job_id());
        status.state = JobState::Running;
        status.priority = JobPriority::High;
        status.user = "tmp-user".to_string();
        status.name = "tmp-jobname".to_string();
        status.queue = "tmp-queue".to_string();
        status.job_file = "tmp-jobfile".to_string();
        status.tracking_url = "tmp-url".to_string();
        Self { status }
    }

    pub fn job_id(mut self, job_id: JobId) -> Self {
        self.status.job_id = job_id;
        self
    }

    /// Map, reduce, setup and cleanup progress, in that order.
    pub fn progress(mut self, map: f32, reduce: f32, setup: f32, cleanup: f32) -> Self {
        self.status.map_progress = map;
        self.status.reduce_progress = reduce;
        self.status.setup_progress = setup;
        self.status.cleanup_progress = cleanup;
        self
    }

    pub fn state(mut self, state: JobState) -> Self {
        self.status.state = state;
        self
    }

    pub fn uber(mut self, is_uber: bool) -> Self {
        self.status.is_uber = is_uber;
        self
    }

    pub fn failure_info(mut self, info: &str) -> Self {
        self.status.failure_info = Some(info.to_string());
        self
    }

    pub fn build(self) -> JobStatus {
        self.status
    }
}

impl Default for JobStatusBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Running snapshot: map done, reduce at 10%.
pub fn j1(uber: bool) -> JobStatus {
    JobStatusBuilder::new()
        .progress(1.0, 0.1, 0.1, 0.0)
        .state(JobState::Running)
        .uber(uber)
        .build()
}

/// Finished snapshot: everything at 100%, SUCCEEDED.
pub fn j2(uber: bool) -> JobStatus {
    JobStatusBuilder::new()
        .progress(1.0, 1.0, 1.0, 1.0)
        .state(JobState::Succeeded)
        .uber(uber)
        .build()
}

pub fn task_event(event_id: u32, status: TaskCompletionStatus) -> TaskCompletionEvent {
    TaskCompletionEvent {
        event_id,
        attempt_id: format!("attempt_000_0001_m_{event_id:06}_0"),
        is_map: true,
        status,
        tracker_http: "http://tracker:50060".to_string(),
    }
}
