// src/source/mod.rs

//! Where the monitor gets its data from.
//!
//! The monitor never talks to a cluster directly. It asks a [`StatusSource`]
//! for snapshots and an [`EventSource`] for task-completion events; whatever
//! transport sits behind them is the implementor's business.
//!
//! - [`scripted`] provides queue-backed sources, used by the `jobmon` binary
//!   (loaded from a scenario file) and by tests.

use std::future::Future;
use std::pin::Pin;

use crate::errors::SourceError;
use crate::types::{JobId, JobStatus, TaskCompletionEvent};

pub mod scenario;
pub mod scripted;

pub use scripted::{NoEvents, ScriptedEventSource, ScriptedStatusSource};

/// Future returned by source calls.
pub type SourceFuture<'a, T> =
    Pin<Box<dyn Future<Output = std::result::Result<T, SourceError>> + Send + 'a>>;

/// Supplies job snapshots on demand.
pub trait StatusSource: Send {
    fn job_status<'a>(&'a mut self, job_id: &'a JobId) -> SourceFuture<'a, JobStatus>;
}

/// Supplies task-completion events starting at `start_index`.
///
/// Returning fewer than `max_events` (including none) means the caller has
/// caught up for now.
pub trait EventSource: Send {
    fn task_completion_events<'a>(
        &'a mut self,
        job_id: &'a JobId,
        start_index: u32,
        max_events: u32,
    ) -> SourceFuture<'a, Vec<TaskCompletionEvent>>;
}

impl<S: StatusSource + ?Sized> StatusSource for Box<S> {
    fn job_status<'a>(&'a mut self, job_id: &'a JobId) -> SourceFuture<'a, JobStatus> {
        (**self).job_status(job_id)
    }
}

impl<E: EventSource + ?Sized> EventSource for Box<E> {
    fn task_completion_events<'a>(
        &'a mut self,
        job_id: &'a JobId,
        start_index: u32,
        max_events: u32,
    ) -> SourceFuture<'a, Vec<TaskCompletionEvent>> {
        (**self).task_completion_events(job_id, start_index, max_events)
    }
}

/// A job bound to the sources that describe it.
#[derive(Debug)]
pub struct JobHandle<S, E> {
    job_id: JobId,
    status: S,
    events: E,
}

impl<S: StatusSource, E: EventSource> JobHandle<S, E> {
    pub fn new(job_id: JobId, status: S, events: E) -> Self {
        Self {
            job_id,
            status,
            events,
        }
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    pub fn status(&mut self) -> SourceFuture<'_, JobStatus> {
        self.status.job_status(&self.job_id)
    }

    pub fn task_completion_events(
        &mut self,
        start_index: u32,
        max_events: u32,
    ) -> SourceFuture<'_, Vec<TaskCompletionEvent>> {
        self.events
            .task_completion_events(&self.job_id, start_index, max_events)
    }

    pub fn status_source(&self) -> &S {
        &self.status
    }

    pub fn event_source(&self) -> &E {
        &self.events
    }
}
