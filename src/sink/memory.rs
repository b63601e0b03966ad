// src/sink/memory.rs

use std::io;
use std::sync::{Arc, Mutex};

use super::Sink;

/// In-memory sink backed by a shared buffer.
///
/// Clones share the same buffer, so a caller can hand one clone to the
/// monitor and keep another to inspect the transcript afterwards.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every line written so far, in order.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Sink for MemorySink {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        let mut lines = self
            .lines
            .lock()
            .map_err(|_| io::Error::other("memory sink lock poisoned"))?;
        lines.push(line.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_buffer() {
        let sink = MemorySink::new();
        let mut writer = sink.clone();

        writer.write_line("first").unwrap();
        writer.write_line("second").unwrap();

        assert_eq!(sink.lines(), vec!["first".to_string(), "second".to_string()]);
        assert_eq!(sink.len(), 2);
    }
}
