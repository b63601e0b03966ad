use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use jobmon::clock::Clock;
use jobmon::sink::Sink;
use jobmon::source::{SourceFuture, StatusSource};
use jobmon::types::{JobId, JobStatus};

/// A clock that:
/// - records every requested delay
/// - returns after a single scheduler yield instead of actually sleeping.
#[derive(Debug, Clone, Default)]
pub struct RecordingClock {
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Clock for RecordingClock {
    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        self.sleeps.lock().unwrap().push(duration);
        Box::pin(tokio::task::yield_now())
    }
}

/// A sink that accepts `ok_lines` lines and then fails every write.
#[derive(Debug, Clone, Default)]
pub struct FailingSink {
    ok_lines: usize,
    written: Arc<Mutex<Vec<String>>>,
}

impl FailingSink {
    pub fn after(ok_lines: usize) -> Self {
        Self {
            ok_lines,
            written: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn written(&self) -> Vec<String> {
        self.written.lock().unwrap().clone()
    }
}

impl Sink for FailingSink {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        let mut written = self.written.lock().unwrap();
        if written.len() >= self.ok_lines {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"));
        }
        written.push(line.to_string());
        Ok(())
    }
}

/// A status source that answers with `status` after `delay` of (Tokio) time.
///
/// The delay is real Tokio time, so keep it well above the status timeout.
#[derive(Debug, Clone)]
pub struct SlowStatusSource {
    status: JobStatus,
    delay: Duration,
    polls: Arc<Mutex<usize>>,
}

impl SlowStatusSource {
    pub fn new(status: JobStatus, delay: Duration) -> Self {
        Self {
            status,
            delay,
            polls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn polls(&self) -> usize {
        *self.polls.lock().unwrap()
    }
}

impl StatusSource for SlowStatusSource {
    fn job_status<'a>(&'a mut self, _job_id: &'a JobId) -> SourceFuture<'a, JobStatus> {
        *self.polls.lock().unwrap() += 1;
        let status = self.status.clone();
        let delay = self.delay;
        Box::pin(async move {
            tokio::time::sleep(delay).await;
            Ok(status)
        })
    }
}
