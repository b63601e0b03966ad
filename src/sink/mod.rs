// src/sink/mod.rs

//! Line-oriented transcript targets.
//!
//! The monitor writes every report line through a [`Sink`]. The binary uses a
//! [`WriterSink`] over stdout; tests and embedders use [`MemorySink`] and read
//! the ordered buffer back.

use std::io::{self, Write};

pub mod memory;

pub use memory::MemorySink;

/// Append-only, ordered line target.
///
/// Implementations must keep lines in the order they were written and must
/// not merge or split them.
pub trait Sink: Send {
    fn write_line(&mut self, line: &str) -> io::Result<()>;
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        (**self).write_line(line)
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        (**self).write_line(line)
    }
}

/// Sink over any [`Write`]: one `\n`-terminated line per call, flushed
/// immediately so progress shows up while the job runs.
#[derive(Debug)]
pub struct WriterSink<W> {
    inner: W,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl WriterSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> Sink for WriterSink<W> {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.inner.write_all(line.as_bytes())?;
        self.inner.write_all(b"\n")?;
        self.inner.flush()
    }
}
