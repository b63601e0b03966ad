// src/monitor/runtime.rs

use std::fmt;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::clock::{Clock, TokioClock};
use crate::errors::{JobmonError, Result, SourceError};
use crate::sink::Sink;
use crate::source::{EventSource, JobHandle, StatusSource};
use crate::types::TaskCompletionEvent;

use super::core::{MonitorCore, MonitorEvent, NextAction};
use super::{MonitorOptions, MonitorOutcome};

/// Upper bound on event requests made during a single poll.
const MAX_EVENT_BATCHES_PER_POLL: usize = 16;

/// Polls a job until it finishes and writes progress reports to a sink.
///
/// This is the IO shell around [`MonitorCore`]: it fetches snapshots and task
/// events, feeds them to the core, writes the returned lines and sleeps
/// between polls. Cancellation is checked at every await point; a cancelled
/// run returns [`MonitorOutcome::Cancelled`] without writing a summary.
pub struct JobMonitor<C: Clock = TokioClock> {
    options: MonitorOptions,
    clock: C,
    cancel: CancellationToken,
}

impl<C: Clock> fmt::Debug for JobMonitor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobMonitor")
            .field("options", &self.options)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl JobMonitor<TokioClock> {
    pub fn new(options: MonitorOptions) -> Self {
        Self::with_clock(options, TokioClock)
    }
}

impl<C: Clock> JobMonitor<C> {
    pub fn with_clock(options: MonitorOptions, clock: C) -> Self {
        Self {
            options,
            clock,
            cancel: CancellationToken::new(),
        }
    }

    /// A handle that cancels this monitor when triggered.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Monitor the job until it finishes, printing progress to `sink`.
    ///
    /// Returns `true` only if the job reached SUCCEEDED. Sink failures are
    /// returned as [`JobmonError::SinkError`].
    pub async fn monitor_and_print<S, E, K>(
        &self,
        job: &mut JobHandle<S, E>,
        sink: &mut K,
    ) -> Result<bool>
    where
        S: StatusSource,
        E: EventSource,
        K: Sink + ?Sized,
    {
        let outcome = self.run(job, sink).await?;
        Ok(outcome.is_success())
    }

    /// Same loop as [`monitor_and_print`](Self::monitor_and_print), returning
    /// the detailed outcome.
    pub async fn run<S, E, K>(
        &self,
        job: &mut JobHandle<S, E>,
        sink: &mut K,
    ) -> Result<MonitorOutcome>
    where
        S: StatusSource,
        E: EventSource,
        K: Sink + ?Sized,
    {
        let mut core = MonitorCore::new(job.job_id().clone(), self.options.clone());
        info!(job = %core.job_id(), "monitoring job");

        write_lines(sink, core.start())?;

        loop {
            let next_event_index = core.next_event_index();
            let event = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Ok(self.cancelled(&core)),
                event = self.poll(job, next_event_index) => event,
            };

            let step = core.step(event);
            write_lines(sink, step.lines)?;

            match step.next {
                NextAction::Finish(outcome) => {
                    info!(job = %core.job_id(), ?outcome, "job monitoring finished");
                    return Ok(outcome);
                }
                NextAction::PollAfter(delay) => {
                    tokio::select! {
                        biased;
                        _ = self.cancel.cancelled() => return Ok(self.cancelled(&core)),
                        _ = self.clock.sleep(delay) => {}
                    }
                }
            }
        }
    }

    /// One status poll plus the task events that follow it.
    async fn poll<S, E>(&self, job: &mut JobHandle<S, E>, next_event_index: u32) -> MonitorEvent
    where
        S: StatusSource,
        E: EventSource,
    {
        let timeout = self.options.status_timeout;
        let result = tokio::time::timeout(timeout, job.status()).await;
        let status = match result {
            Ok(Ok(status)) => status,
            Ok(Err(err)) => {
                warn!(job = %job.job_id(), error = %err, "status poll failed");
                return MonitorEvent::PollFailed(err);
            }
            Err(_) => {
                warn!(job = %job.job_id(), ?timeout, "status poll timed out");
                return MonitorEvent::PollFailed(SourceError::Transient(format!(
                    "status request timed out after {timeout:?}"
                )));
            }
        };

        debug!(
            job = %status.job_id,
            state = %status.state,
            map = status.map_progress,
            reduce = status.reduce_progress,
            uber = status.is_uber,
            "status polled"
        );

        let events = self.drain_events(job, next_event_index).await;
        MonitorEvent::Polled { status, events }
    }

    /// Fetch task events from `start_index` until a short batch comes back.
    ///
    /// Event replay is advisory: any failure is logged and whatever was
    /// collected so far is returned.
    async fn drain_events<S, E>(
        &self,
        job: &mut JobHandle<S, E>,
        start_index: u32,
    ) -> Vec<TaskCompletionEvent>
    where
        S: StatusSource,
        E: EventSource,
    {
        let batch_size = self.options.event_batch_size;
        let timeout = self.options.status_timeout;
        let mut collected = Vec::new();
        let mut index = start_index;

        for _ in 0..MAX_EVENT_BATCHES_PER_POLL {
            let request = job.task_completion_events(index, batch_size);
            let result = tokio::time::timeout(timeout, request).await;
            let batch = match result {
                Ok(Ok(batch)) => batch,
                Ok(Err(err)) => {
                    warn!(
                        job = %job.job_id(),
                        start_index = index,
                        error = %err,
                        "failed to fetch task completion events; continuing"
                    );
                    break;
                }
                Err(_) => {
                    warn!(
                        job = %job.job_id(),
                        start_index = index,
                        ?timeout,
                        "task completion event request timed out; continuing"
                    );
                    break;
                }
            };

            let received = batch.len();
            index = index.saturating_add(u32::try_from(received).unwrap_or(u32::MAX));
            collected.extend(batch);

            if received < batch_size as usize {
                break;
            }
        }

        if !collected.is_empty() {
            debug!(
                job = %job.job_id(),
                count = collected.len(),
                "received task completion events"
            );
        }
        collected
    }

    fn cancelled(&self, core: &MonitorCore) -> MonitorOutcome {
        info!(
            job = %core.job_id(),
            last_state = ?core.last_state(),
            "monitoring cancelled"
        );
        MonitorOutcome::Cancelled
    }
}

fn write_lines<K: Sink + ?Sized>(sink: &mut K, lines: Vec<String>) -> Result<()> {
    for line in lines {
        sink.write_line(&line).map_err(JobmonError::SinkError)?;
    }
    Ok(())
}
