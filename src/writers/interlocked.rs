//! # InterlockedWriter: serialized output sink.
//!
//! Concurrent writers share one sink through [`InterlockedWriter`]. Each call to
//! [`InterlockedWriter::write_all`] holds the lock for one complete
//! `write_all` + `flush`, so lines written from different workers never
//! interleave.
//!
//! ```text
//!  worker A ── render line A ──┐
//!                              ├──► lock ─► write_all ─► flush ─► unlock
//!  worker B ── render line B ──┘
//! ```
//!
//! Clones share the same sink and the same lock.

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;

/// Mutex-guarded output sink. Cheap to clone.
#[derive(Clone)]
pub struct InterlockedWriter {
    inner: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl InterlockedWriter {
    /// Wraps any writer.
    #[must_use]
    pub fn new<W>(writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        Self {
            inner: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Sink writing to the process stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Sink writing to the process stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    /// Writes the whole buffer and flushes, holding the lock throughout.
    pub fn write_all(&self, bytes: &[u8]) -> io::Result<()> {
        let mut sink = self.inner.lock();
        sink.write_all(bytes)?;
        sink.flush()
    }

    /// True if both handles share the same underlying sink.
    pub fn same_sink(&self, other: &InterlockedWriter) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for InterlockedWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterlockedWriter").finish_non_exhaustive()
    }
}

/// In-memory sink for capturing output (tests, demos).
///
/// Clones share the same buffer.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns everything written so far, lossily decoded as UTF-8.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock()).into_owned()
    }

    /// Returns written lines (without terminators).
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }
}

impl Write for MemorySink {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.lock().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
