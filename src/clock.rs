// src/clock.rs

//! Injectable delay used between status polls.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Source of the poll-interval delay.
///
/// Production code uses [`TokioClock`]; tests can supply a clock that records
/// the requested durations and returns immediately.
pub trait Clock: Send + Sync {
    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

/// Real clock backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(tokio::time::sleep(duration))
    }
}
