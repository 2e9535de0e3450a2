//! # Built-in events.
//!
//! - [`MessageEvent`] a flag plus a free-form message, optionally with its own flag color.
//! - [`ErrorEvent`] an error description for `fatal`/`error` flags, rendered in red.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Local, TimeZone};

use super::event::{Event, FlagTextColorProvider, TextWritable};
use crate::flags::Flag;
use crate::writers::{AnsiColor, TextFormatter};

/// Free-form text event.
///
/// ## Example
/// ```rust
/// use fanlog::{AnsiColor, Flag, MessageEvent};
///
/// let ev = MessageEvent::new(Flag::INFO, "service started").with_flag_color(AnsiColor::CYAN);
/// assert_eq!(ev.message(), "service started");
/// ```
#[derive(Clone, Debug)]
pub struct MessageEvent {
    flag: Flag,
    at: DateTime<FixedOffset>,
    message: Arc<str>,
    flag_color: Option<AnsiColor>,
}

impl MessageEvent {
    /// Creates a message stamped with the current time.
    #[must_use]
    pub fn new(flag: impl Into<Flag>, message: impl Into<Arc<str>>) -> Self {
        Self {
            flag: flag.into(),
            at: Local::now().fixed_offset(),
            message: message.into(),
            flag_color: None,
        }
    }

    /// Overrides the timestamp.
    #[inline]
    #[must_use]
    pub fn with_timestamp<Tz: TimeZone>(mut self, at: DateTime<Tz>) -> Self {
        self.at = at.fixed_offset();
        self
    }

    /// Sets a custom color for the flag column.
    #[inline]
    #[must_use]
    pub fn with_flag_color(mut self, color: AnsiColor) -> Self {
        self.flag_color = Some(color);
        self
    }

    /// Message text.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for MessageEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl FlagTextColorProvider for MessageEvent {
    fn flag_text_color(&self) -> Option<AnsiColor> {
        self.flag_color
    }
}

impl Event for MessageEvent {
    fn flag(&self) -> Flag {
        self.flag.clone()
    }

    fn timestamp(&self) -> DateTime<FixedOffset> {
        self.at
    }

    fn as_color_provider(&self) -> Option<&dyn FlagTextColorProvider> {
        Some(self)
    }

    fn as_display(&self) -> Option<&dyn fmt::Display> {
        Some(self)
    }
}

/// Error report event.
///
/// The description is captured at construction, including the `source()` chain,
/// so the event stays `Send + Sync` regardless of the original error type.
#[derive(Clone, Debug)]
pub struct ErrorEvent {
    flag: Flag,
    at: DateTime<FixedOffset>,
    description: Arc<str>,
}

impl ErrorEvent {
    /// Creates an error event from a ready description.
    #[must_use]
    pub fn new(flag: impl Into<Flag>, description: impl Into<Arc<str>>) -> Self {
        Self {
            flag: flag.into(),
            at: Local::now().fixed_offset(),
            description: description.into(),
        }
    }

    /// Creates an error event from an error value, joining its source chain with `": "`.
    #[must_use]
    pub fn from_error(flag: impl Into<Flag>, err: &(dyn StdError + 'static)) -> Self {
        let mut description = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            description.push_str(": ");
            description.push_str(&cause.to_string());
            source = cause.source();
        }
        Self::new(flag, description)
    }

    /// Shorthand for a `fatal` error event.
    #[must_use]
    pub fn fatal(description: impl Into<Arc<str>>) -> Self {
        Self::new(Flag::FATAL, description)
    }

    /// Overrides the timestamp.
    #[inline]
    #[must_use]
    pub fn with_timestamp<Tz: TimeZone>(mut self, at: DateTime<Tz>) -> Self {
        self.at = at.fixed_offset();
        self
    }

    /// Error description.
    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl TextWritable for ErrorEvent {
    fn write_text(&self, formatter: &dyn TextFormatter, buf: &mut String) {
        buf.push_str(&formatter.colorize(&self.description, AnsiColor::RED));
    }
}

impl Event for ErrorEvent {
    fn flag(&self) -> Flag {
        self.flag.clone()
    }

    fn timestamp(&self) -> DateTime<FixedOffset> {
        self.at
    }

    fn as_text_writable(&self) -> Option<&dyn TextWritable> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ListenerError, WorkerError, WriterError};

    #[test]
    fn test_message_event_capabilities() {
        let ev = MessageEvent::new(Flag::INFO, "hello");
        assert!(ev.as_text_writable().is_none());
        assert_eq!(ev.as_display().map(|d| d.to_string()).as_deref(), Some("hello"));
        assert_eq!(ev.as_color_provider().and_then(|p| p.flag_text_color()), None);

        let ev = ev.with_flag_color(AnsiColor::GREEN);
        assert_eq!(
            ev.as_color_provider().and_then(|p| p.flag_text_color()),
            Some(AnsiColor::GREEN)
        );
    }

    #[test]
    fn test_error_event_joins_source_chain() {
        let err = WorkerError::ListenerFailed {
            listener: "stdout",
            source: ListenerError::failed("pipe closed"),
        };
        let ev = ErrorEvent::from_error(Flag::FATAL, &err);
        assert_eq!(
            ev.description(),
            "listener 'stdout' failed: listener failed: pipe closed"
        );
        assert_eq!(ev.flag(), Flag::FATAL);
        assert!(ev.as_display().is_none());
    }

    #[test]
    fn test_error_event_reports_each_cause_once() {
        let err = WorkerError::ListenerFailed {
            listener: "file",
            source: WriterError::Io(std::io::Error::other("disk full")).into(),
        };
        let ev = ErrorEvent::from_error(Flag::ERROR, &err);
        assert_eq!(ev.description(), "listener 'file' failed: sink write failed: disk full");
    }
}
