//! # Adapters implementing [`Listener`].
//!
//! - [`ListenerFn`] wraps a plain closure.
//! - [`WriterListener`] forwards events to a [`Writer`], sending `fatal`/`error`
//!   flags to its error output.

use std::sync::Arc;

use async_trait::async_trait;

use super::listener::{DEFAULT_WORKER_QUEUE_DEPTH, Listener};
use crate::error::ListenerError;
use crate::events::EventRef;
use crate::writers::Writer;

/// Closure-backed listener.
///
/// ## Example
/// ```rust
/// use fanlog::{EventRef, Listener, ListenerFn};
///
/// let l = ListenerFn::arc("stdout", |ev: &EventRef| {
///     println!("{}", ev.flag());
///     Ok(())
/// });
/// assert_eq!(l.name(), "stdout");
/// ```
pub struct ListenerFn<F> {
    name: &'static str,
    capacity: usize,
    f: F,
}

impl<F> ListenerFn<F>
where
    F: Fn(&EventRef) -> Result<(), ListenerError> + Send + Sync + 'static,
{
    /// Creates a closure-backed listener with the default queue depth.
    #[must_use]
    pub fn new(name: &'static str, f: F) -> Self {
        Self {
            name,
            capacity: DEFAULT_WORKER_QUEUE_DEPTH,
            f,
        }
    }

    /// Creates the listener and returns it as a shared handle.
    #[must_use]
    pub fn arc(name: &'static str, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }

    /// Overrides the queue depth.
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }
}

#[async_trait]
impl<F> Listener for ListenerFn<F>
where
    F: Fn(&EventRef) -> Result<(), ListenerError> + Send + Sync + 'static,
{
    async fn on_event(&self, event: &EventRef) -> Result<(), ListenerError> {
        (self.f)(event)
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn queue_capacity(&self) -> usize {
        self.capacity
    }
}

/// Listener writing every event through a [`Writer`].
pub struct WriterListener<W> {
    name: &'static str,
    writer: Arc<W>,
}

impl<W: Writer> WriterListener<W> {
    /// Wraps a shared writer.
    #[must_use]
    pub fn new(name: &'static str, writer: Arc<W>) -> Self {
        Self { name, writer }
    }

    /// The wrapped writer.
    pub fn writer(&self) -> &Arc<W> {
        &self.writer
    }
}

#[async_trait]
impl<W: Writer> Listener for WriterListener<W> {
    async fn on_event(&self, event: &EventRef) -> Result<(), ListenerError> {
        if event.flag().is_error() {
            self.writer.write_error(event.as_ref())?;
        } else {
            self.writer.write(event.as_ref())?;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{ErrorEvent, MessageEvent};
    use crate::flags::Flag;
    use crate::writers::{InterlockedWriter, MemorySink, TextWriter};

    #[tokio::test]
    async fn test_writer_listener_routes_error_flags() {
        let out = MemorySink::new();
        let err = MemorySink::new();
        let writer = TextWriter::new(InterlockedWriter::new(out.clone()))
            .with_error_output(InterlockedWriter::new(err.clone()))
            .with_use_color(false)
            .with_show_timestamp(false);
        let listener = WriterListener::new("text", Arc::new(writer));

        let info: EventRef = Arc::new(MessageEvent::new(Flag::INFO, "up"));
        let warn: EventRef = Arc::new(MessageEvent::new(Flag::WARNING, "slow"));
        let fatal: EventRef = Arc::new(ErrorEvent::fatal("down"));
        for ev in [&info, &warn, &fatal] {
            listener.on_event(ev).await.unwrap();
        }

        assert_eq!(out.lines(), vec!["[info] up", "[warning] slow"]);
        assert_eq!(err.lines(), vec!["[fatal] down"]);
    }

    #[tokio::test]
    async fn test_listener_fn_forwards_result() {
        let l = ListenerFn::new("picky", |ev: &EventRef| {
            if ev.flag() == Flag::DEBUG {
                Err(ListenerError::failed("debug not accepted"))
            } else {
                Ok(())
            }
        })
        .with_queue_capacity(8);

        assert_eq!(l.queue_capacity(), 8);
        let ok: EventRef = Arc::new(MessageEvent::new(Flag::INFO, "x"));
        let bad: EventRef = Arc::new(MessageEvent::new(Flag::DEBUG, "x"));
        assert!(l.on_event(&ok).await.is_ok());
        assert_eq!(l.on_event(&bad).await.unwrap_err().as_label(), "listener_failed");
    }
}
