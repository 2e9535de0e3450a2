//! Writers: render events to text and flush them to synchronized sinks.
//!
//! ## Contents
//! - [`Writer`] the seam listeners use to hand events to an output format
//! - [`TextFormatter`] color helpers offered to [`TextWritable`](crate::TextWritable) events
//! - [`TextWriter`], [`TimeFormat`] the human-readable line format
//! - [`InterlockedWriter`], [`MemorySink`] serialized output sinks
//! - [`BufferPool`], [`PooledBuffer`] scratch buffer leasing
//! - [`AnsiColor`], [`FlagTextColors`] colors and the flag color table

mod color;
mod interlocked;
mod pool;
mod text;

pub use color::{
    AnsiColor, FlagTextColors, colorize_by_status_code, colorize_status_code, status_code_color,
};
pub use interlocked::{InterlockedWriter, MemorySink};
pub use pool::{BufferPool, DEFAULT_BUFFER_POOL_SIZE, MAX_RETAINED_BYTES, PooledBuffer};
pub use text::{
    DEFAULT_TEXT_WRITER_SHOW_LABEL, DEFAULT_TEXT_WRITER_SHOW_TIMESTAMP,
    DEFAULT_TEXT_WRITER_USE_COLOR, TextWriter, TimeFormat,
};

use crate::error::WriterError;
use crate::events::Event;

/// Output format for events.
///
/// `write` targets the primary output, `write_error` the error output.
pub trait Writer: Send + Sync + 'static {
    /// Renders and flushes `event` to the primary output.
    fn write(&self, event: &dyn Event) -> Result<(), WriterError>;

    /// Renders and flushes `event` to the error output.
    fn write_error(&self, event: &dyn Event) -> Result<(), WriterError>;

    /// Label identifying the process or component in output.
    fn label(&self) -> &str;
}

/// Color helpers available to events rendering their own body.
///
/// Every method is a passthrough when the writer has colors disabled.
pub trait TextFormatter {
    /// Applies `color` to `value`.
    fn colorize(&self, value: &str, color: AnsiColor) -> String;

    /// Renders an HTTP status code in its status color.
    fn colorize_status_code(&self, status_code: u16) -> String;

    /// Renders `value` in the color of an HTTP status code.
    fn colorize_by_status_code(&self, status_code: u16, value: &str) -> String;
}
