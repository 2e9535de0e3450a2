//! # Event contract and optional rendering capabilities.
//!
//! Every event exposes a [`Flag`] and a timestamp. Beyond that, an event may opt
//! into any of three capabilities, each probed through an accessor that returns
//! `None` by default:
//!
//! | Probe                              | Capability                    | Used for              |
//! |------------------------------------|-------------------------------|-----------------------|
//! | [`Event::as_text_writable`]        | [`TextWritable`]              | custom text body      |
//! | [`Event::as_color_provider`]       | [`FlagTextColorProvider`]     | custom flag color     |
//! | [`Event::as_display`]              | [`std::fmt::Display`]         | fallback text body    |
//!
//! A text writer probes them in a fixed order (see
//! [`TextWriter`](crate::TextWriter)); an event declares what it supports by
//! overriding the matching accessor to return `Some(self)`.
//!
//! ## Example
//! ```rust
//! use std::fmt;
//! use chrono::{DateTime, FixedOffset};
//! use fanlog::{Event, Flag};
//!
//! struct Ping {
//!     at: DateTime<FixedOffset>,
//!     url: String,
//!     status: u16,
//! }
//!
//! impl fmt::Display for Ping {
//!     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
//!         write!(f, "{} {}", self.status, self.url)
//!     }
//! }
//!
//! impl Event for Ping {
//!     fn flag(&self) -> Flag { Flag::from_static("ping") }
//!     fn timestamp(&self) -> DateTime<FixedOffset> { self.at }
//!     fn as_display(&self) -> Option<&dyn fmt::Display> { Some(self) }
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};

use crate::flags::Flag;
use crate::writers::{AnsiColor, TextFormatter};

/// Shared handle to a type-erased event, as carried by worker queues.
pub type EventRef = Arc<dyn Event>;

/// An event that can be filtered, queued and rendered.
pub trait Event: Send + Sync + 'static {
    /// Category tag used for filtering and display.
    fn flag(&self) -> Flag;

    /// When the event happened.
    ///
    /// The offset is kept: text output renders the time in the event's own zone.
    fn timestamp(&self) -> DateTime<FixedOffset>;

    /// Custom text rendering capability.
    fn as_text_writable(&self) -> Option<&dyn TextWritable> {
        None
    }

    /// Custom flag color capability.
    fn as_color_provider(&self) -> Option<&dyn FlagTextColorProvider> {
        None
    }

    /// Generic string conversion capability.
    fn as_display(&self) -> Option<&dyn fmt::Display> {
        None
    }
}

/// Event body with a custom text layout.
pub trait TextWritable {
    /// Appends the body to `buf`, using `formatter` for colors.
    ///
    /// Must not append the trailing newline; the writer does.
    fn write_text(&self, formatter: &dyn TextFormatter, buf: &mut String);
}

/// Event that picks its own flag color.
pub trait FlagTextColorProvider {
    /// Color for the flag column; `None` defers to the writer's flag colors.
    fn flag_text_color(&self) -> Option<AnsiColor>;
}
