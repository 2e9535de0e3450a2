//! Error types used by writers, listeners and workers.
//!
//! This module defines three enums:
//!
//! - [`WriterError`]: failures flushing a rendered line to an output sink.
//! - [`ListenerError`]: failures returned by a [`Listener`](crate::Listener).
//! - [`WorkerError`]: queue admission failures and the listener faults a
//!   [`Worker`](crate::Worker) reports to its parent sink.
//!
//! All of them provide `as_label` for logs/metrics.

use thiserror::Error;

/// # Errors produced while flushing to an output sink.
///
/// Formatting itself never fails; only the final write can.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum WriterError {
    /// The underlying sink rejected the write; the I/O error is the source.
    #[error("sink write failed")]
    Io(#[from] std::io::Error),
}

impl WriterError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use fanlog::WriterError;
    ///
    /// let err = WriterError::Io(std::io::Error::other("closed pipe"));
    /// assert_eq!(err.as_label(), "writer_io");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            WriterError::Io(_) => "writer_io",
        }
    }
}

/// # Errors returned by listeners.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ListenerError {
    /// Listener could not handle the event.
    #[error("listener failed: {reason}")]
    Failed {
        /// Human-readable failure reason.
        reason: String,
    },

    /// Listener forwarded the event to a writer and the write failed.
    #[error(transparent)]
    Write(#[from] WriterError),
}

impl ListenerError {
    /// Shorthand for [`ListenerError::Failed`].
    #[must_use]
    pub fn failed(reason: impl Into<String>) -> Self {
        ListenerError::Failed {
            reason: reason.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ListenerError::Failed { .. } => "listener_failed",
            ListenerError::Write(_) => "listener_write",
        }
    }
}

/// # Errors produced by a worker.
///
/// `QueueFull` and `Closed` are returned to producers.
/// `ListenerPanicked` and `ListenerFailed` never reach producers: the worker's
/// fault boundary hands them to the parent [`FatalSink`](crate::FatalSink).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum WorkerError {
    /// The worker's queue has no free slot; the event was not enqueued.
    #[error("worker '{listener}' queue is full")]
    QueueFull {
        /// Name of the listener the worker serves.
        listener: &'static str,
    },

    /// The worker was closed; the event was not enqueued.
    #[error("worker '{listener}' is closed")]
    Closed {
        /// Name of the listener the worker serves.
        listener: &'static str,
    },

    /// The listener panicked while processing an event.
    #[error("listener '{listener}' panicked: {info}")]
    ListenerPanicked {
        /// Name of the listener.
        listener: &'static str,
        /// Panic payload rendered as text.
        info: String,
    },

    /// The listener returned an error while processing an event.
    ///
    /// The listener's error is the `source()`; it is not repeated in `Display`.
    #[error("listener '{listener}' failed")]
    ListenerFailed {
        /// Name of the listener.
        listener: &'static str,
        /// The error returned by the listener.
        #[source]
        source: ListenerError,
    },
}

impl WorkerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use fanlog::WorkerError;
    ///
    /// let err = WorkerError::QueueFull { listener: "stdout" };
    /// assert_eq!(err.as_label(), "worker_queue_full");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            WorkerError::QueueFull { .. } => "worker_queue_full",
            WorkerError::Closed { .. } => "worker_closed",
            WorkerError::ListenerPanicked { .. } => "listener_panicked",
            WorkerError::ListenerFailed { .. } => "listener_failed",
        }
    }

    /// Name of the listener this error concerns.
    pub fn listener(&self) -> &'static str {
        match self {
            WorkerError::QueueFull { listener }
            | WorkerError::Closed { listener }
            | WorkerError::ListenerPanicked { listener, .. }
            | WorkerError::ListenerFailed { listener, .. } => listener,
        }
    }

    /// True for the two admission errors (`QueueFull`, `Closed`).
    pub fn is_admission(&self) -> bool {
        matches!(
            self,
            WorkerError::QueueFull { .. } | WorkerError::Closed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::error::Error as _;

    #[test]
    fn test_listener_failed_keeps_cause_in_source_only() {
        let err = WorkerError::ListenerFailed {
            listener: "audit",
            source: ListenerError::failed("disk full"),
        };
        assert_eq!(err.to_string(), "listener 'audit' failed");
        assert_eq!(
            err.source().map(|s| s.to_string()).as_deref(),
            Some("listener failed: disk full")
        );
        assert_eq!(err.listener(), "audit");
        assert!(!err.is_admission());
    }

    #[test]
    fn test_write_error_is_transparent() {
        let err: ListenerError = WriterError::Io(std::io::Error::other("broken pipe")).into();
        assert_eq!(err.to_string(), "sink write failed");
        assert_eq!(
            err.source().map(|s| s.to_string()).as_deref(),
            Some("broken pipe")
        );
        assert_eq!(err.as_label(), "listener_write");
    }

    #[test]
    fn test_admission_errors() {
        assert!(WorkerError::Closed { listener: "x" }.is_admission());
        assert!(WorkerError::QueueFull { listener: "x" }.is_admission());
    }
}
