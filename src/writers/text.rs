//! # TextWriter: one event, one line.
//!
//! Renders an [`Event`] as a single newline-terminated line of columns and
//! flushes it to an [`InterlockedWriter`] in one call.
//!
//! ## Line layout
//! ```text
//! <timestamp> [<label>] [<flag>] <body>\n
//!     │           │        │       │
//!     │           │        │       └─ TextWritable → Display → nothing
//!     │           │        └─ color: provider → flag colors
//!     │           └─ only when show_label and label is non-empty (blue)
//!     └─ only when show_timestamp (gray)
//! ```
//!
//! ## Concurrency
//! - Rendering happens in a leased scratch buffer, independently per call.
//! - The only synchronized step is the final flush; the sink's lock keeps
//!   concurrent lines from interleaving.
//! - The lease is returned on every exit path (RAII guard), including sink errors.
//!
//! ## Example
//! ```rust
//! use fanlog::{Flag, InterlockedWriter, MemorySink, MessageEvent, TextWriter, Writer};
//!
//! let sink = MemorySink::new();
//! let writer = TextWriter::new(InterlockedWriter::new(sink.clone()))
//!     .with_use_color(false)
//!     .with_show_timestamp(false)
//!     .with_label("api");
//!
//! writer.write(&MessageEvent::new(Flag::INFO, "listening on :8080")).unwrap();
//! assert_eq!(sink.contents(), "[api] [info] listening on :8080\n");
//! ```

use std::fmt::Write as _;

use chrono::{DateTime, FixedOffset, SecondsFormat};

use super::color::{self, AnsiColor, FlagTextColors};
use super::interlocked::InterlockedWriter;
use super::pool::BufferPool;
use super::{TextFormatter, Writer};
use crate::config::Config;
use crate::error::WriterError;
use crate::events::Event;
use crate::flags::Flag;

pub const DEFAULT_TEXT_WRITER_USE_COLOR: bool = true;
pub const DEFAULT_TEXT_WRITER_SHOW_TIMESTAMP: bool = true;
pub const DEFAULT_TEXT_WRITER_SHOW_LABEL: bool = true;

const SPACE: char = ' ';
const NEWLINE: char = '\n';

/// Timestamp layout for the first column.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum TimeFormat {
    /// RFC 3339 with second precision, `Z` for UTC (`2024-05-01T12:30:00Z`).
    #[default]
    Rfc3339,
    /// A `strftime` pattern (see [`chrono::format::strftime`]).
    ///
    /// An invalid pattern falls back to [`TimeFormat::Rfc3339`] at render time.
    Strftime(String),
}

impl TimeFormat {
    /// Builds a format from a pattern; empty means [`TimeFormat::Rfc3339`].
    #[must_use]
    pub fn from_pattern(pattern: &str) -> Self {
        match pattern.trim() {
            "" => TimeFormat::Rfc3339,
            p if p.eq_ignore_ascii_case("rfc3339") => TimeFormat::Rfc3339,
            p => TimeFormat::Strftime(p.to_string()),
        }
    }

    /// Formats `at` in this layout.
    pub fn format(&self, at: &DateTime<FixedOffset>) -> String {
        let rfc3339 = || at.to_rfc3339_opts(SecondsFormat::Secs, true);
        match self {
            TimeFormat::Rfc3339 => rfc3339(),
            TimeFormat::Strftime(pattern) => {
                let mut out = String::new();
                match write!(out, "{}", at.format(pattern)) {
                    Ok(()) => out,
                    Err(_) => rfc3339(),
                }
            }
        }
    }
}

/// Human-readable, optionally colorized line writer.
///
/// Safe to share across workers (`Arc<TextWriter>`); it holds no per-event state.
#[derive(Clone, Debug)]
pub struct TextWriter {
    output: InterlockedWriter,
    error_output: Option<InterlockedWriter>,

    show_timestamp: bool,
    show_label: bool,
    use_color: bool,

    time_format: TimeFormat,
    label: String,

    flag_colors: FlagTextColors,
    buffer_pool: BufferPool,
}

impl TextWriter {
    /// Creates a writer with default options; errors go to the same output.
    #[must_use]
    pub fn new(output: InterlockedWriter) -> Self {
        Self {
            output,
            error_output: None,
            show_timestamp: DEFAULT_TEXT_WRITER_SHOW_TIMESTAMP,
            show_label: DEFAULT_TEXT_WRITER_SHOW_LABEL,
            use_color: DEFAULT_TEXT_WRITER_USE_COLOR,
            time_format: TimeFormat::default(),
            label: String::new(),
            flag_colors: FlagTextColors::default(),
            buffer_pool: BufferPool::default(),
        }
    }

    /// Writer on stdout (primary) and stderr (errors) configured from `cfg`.
    #[must_use]
    pub fn from_config(cfg: &Config) -> Self {
        Self::new(InterlockedWriter::stdout())
            .with_error_output(InterlockedWriter::stderr())
            .with_show_timestamp(cfg.show_timestamp)
            .with_show_label(cfg.show_label)
            .with_use_color(cfg.use_color)
            .with_label(cfg.label.clone())
            .with_time_format(TimeFormat::from_pattern(&cfg.time_format))
    }

    /// Writer on stdout/stderr configured from the process environment.
    pub fn from_env() -> Self {
        Self::from_config(&Config::from_env())
    }

    #[inline]
    pub fn use_color(&self) -> bool {
        self.use_color
    }

    #[must_use]
    pub fn with_use_color(mut self, use_color: bool) -> Self {
        self.use_color = use_color;
        self
    }

    #[inline]
    pub fn show_timestamp(&self) -> bool {
        self.show_timestamp
    }

    #[must_use]
    pub fn with_show_timestamp(mut self, show_timestamp: bool) -> Self {
        self.show_timestamp = show_timestamp;
        self
    }

    #[inline]
    pub fn show_label(&self) -> bool {
        self.show_label
    }

    #[must_use]
    pub fn with_show_label(mut self, show_label: bool) -> Self {
        self.show_label = show_label;
        self
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[inline]
    pub fn time_format(&self) -> &TimeFormat {
        &self.time_format
    }

    #[must_use]
    pub fn with_time_format(mut self, time_format: TimeFormat) -> Self {
        self.time_format = time_format;
        self
    }

    /// Primary output.
    #[inline]
    pub fn output(&self) -> &InterlockedWriter {
        &self.output
    }

    #[must_use]
    pub fn with_output(mut self, output: InterlockedWriter) -> Self {
        self.output = output;
        self
    }

    /// Error output, falling back to the primary output when unset.
    #[inline]
    pub fn error_output(&self) -> &InterlockedWriter {
        self.error_output.as_ref().unwrap_or(&self.output)
    }

    #[must_use]
    pub fn with_error_output(mut self, error_output: InterlockedWriter) -> Self {
        self.error_output = Some(error_output);
        self
    }

    /// Overrides the color used for one flag.
    #[must_use]
    pub fn with_flag_color(mut self, flag: impl Into<Flag>, color: AnsiColor) -> Self {
        self.flag_colors.set(flag, color);
        self
    }

    /// Replaces the whole flag color table.
    #[must_use]
    pub fn with_flag_colors(mut self, flag_colors: FlagTextColors) -> Self {
        self.flag_colors = flag_colors;
        self
    }

    /// Shares a buffer pool with other writers.
    #[must_use]
    pub fn with_buffer_pool(mut self, buffer_pool: BufferPool) -> Self {
        self.buffer_pool = buffer_pool;
        self
    }

    /// Formats a flag column: `[flag]`, flag text colored.
    pub fn format_flag(&self, flag: &Flag, color: AnsiColor) -> String {
        format!("[{}]", self.colorize(flag.as_str(), color))
    }

    /// Formats the label column: `[label]`, label text in blue.
    pub fn format_label(&self) -> String {
        format!("[{}]", self.colorize(&self.label, AnsiColor::BLUE))
    }

    /// Formats a timestamp column in gray.
    pub fn format_timestamp(&self, at: &DateTime<FixedOffset>) -> String {
        self.colorize(&self.time_format.format(at), AnsiColor::GRAY)
    }

    /// Color for the flag column of `event`.
    fn flag_color(&self, event: &dyn Event, flag: &Flag) -> AnsiColor {
        event
            .as_color_provider()
            .and_then(|provider| provider.flag_text_color())
            .unwrap_or_else(|| self.flag_colors.get(flag))
    }

    /// Appends the full line for `event` (newline included) to `buf`.
    pub fn render(&self, event: &dyn Event, buf: &mut String) {
        if self.show_timestamp {
            buf.push_str(&self.format_timestamp(&event.timestamp()));
            buf.push(SPACE);
        }

        if self.show_label && !self.label.is_empty() {
            buf.push_str(&self.format_label());
            buf.push(SPACE);
        }

        let flag = event.flag();
        let color = self.flag_color(event, &flag);
        buf.push_str(&self.format_flag(&flag, color));
        buf.push(SPACE);

        if let Some(writable) = event.as_text_writable() {
            writable.write_text(self, buf);
        } else if let Some(display) = event.as_display() {
            let _ = write!(buf, "{display}");
        }

        buf.push(NEWLINE);
    }

    fn write_to(&self, output: &InterlockedWriter, event: &dyn Event) -> Result<(), WriterError> {
        let mut buf = self.buffer_pool.lease();
        self.render(event, &mut buf);
        output.write_all(buf.as_bytes())?;
        Ok(())
    }
}

impl TextFormatter for TextWriter {
    fn colorize(&self, value: &str, color: AnsiColor) -> String {
        if self.use_color {
            color.apply(value)
        } else {
            value.to_string()
        }
    }

    fn colorize_status_code(&self, status_code: u16) -> String {
        if self.use_color {
            color::colorize_status_code(status_code)
        } else {
            status_code.to_string()
        }
    }

    fn colorize_by_status_code(&self, status_code: u16, value: &str) -> String {
        if self.use_color {
            color::colorize_by_status_code(status_code, value)
        } else {
            value.to_string()
        }
    }
}

impl Writer for TextWriter {
    fn write(&self, event: &dyn Event) -> Result<(), WriterError> {
        self.write_to(&self.output, event)
    }

    fn write_error(&self, event: &dyn Event) -> Result<(), WriterError> {
        self.write_to(self.error_output(), event)
    }

    fn label(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use std::fmt;
    use std::io;
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::events::{ErrorEvent, FlagTextColorProvider, MessageEvent, TextWritable};
    use crate::writers::MemorySink;

    fn at() -> DateTime<FixedOffset> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap().fixed_offset()
    }

    fn capture() -> (MemorySink, TextWriter) {
        let sink = MemorySink::new();
        let writer = TextWriter::new(InterlockedWriter::new(sink.clone())).with_use_color(false);
        (sink, writer)
    }

    struct Ping {
        at: DateTime<FixedOffset>,
        status: u16,
    }

    impl fmt::Display for Ping {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "status={}", self.status)
        }
    }

    impl Event for Ping {
        fn flag(&self) -> Flag {
            Flag::from_static("ping")
        }
        fn timestamp(&self) -> DateTime<FixedOffset> {
            self.at
        }
        fn as_display(&self) -> Option<&dyn fmt::Display> {
            Some(self)
        }
    }

    struct Request {
        at: DateTime<FixedOffset>,
        status: u16,
    }

    impl TextWritable for Request {
        fn write_text(&self, formatter: &dyn TextFormatter, buf: &mut String) {
            buf.push_str("GET /health ");
            buf.push_str(&formatter.colorize_status_code(self.status));
        }
    }

    impl FlagTextColorProvider for Request {
        fn flag_text_color(&self) -> Option<AnsiColor> {
            Some(AnsiColor::CYAN)
        }
    }

    impl fmt::Display for Request {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("display must not be used")
        }
    }

    impl Event for Request {
        fn flag(&self) -> Flag {
            Flag::HTTP_REQUEST
        }
        fn timestamp(&self) -> DateTime<FixedOffset> {
            self.at
        }
        fn as_text_writable(&self) -> Option<&dyn TextWritable> {
            Some(self)
        }
        fn as_color_provider(&self) -> Option<&dyn FlagTextColorProvider> {
            Some(self)
        }
        fn as_display(&self) -> Option<&dyn fmt::Display> {
            Some(self)
        }
    }

    /// Event with neither body capability.
    struct Bare;

    impl Event for Bare {
        fn flag(&self) -> Flag {
            Flag::DEBUG
        }
        fn timestamp(&self) -> DateTime<FixedOffset> {
            at()
        }
    }

    struct FailingSink;

    impl io::Write for FailingSink {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_empty_label_is_omitted() {
        let (sink, writer) = capture();
        let writer = writer.with_show_timestamp(true).with_show_label(true).with_label("");

        writer.write(&Ping { at: at(), status: 200 }).unwrap();
        assert_eq!(sink.contents(), "2024-05-01T12:30:00Z [ping] status=200\n");
    }

    #[test]
    fn test_timestamp_keeps_event_offset() {
        let (sink, writer) = capture();
        let warsaw = FixedOffset::east_opt(2 * 3600).unwrap();
        let local = warsaw.with_ymd_and_hms(2024, 5, 1, 14, 30, 0).unwrap();

        writer.write(&Ping { at: local, status: 200 }).unwrap();
        assert_eq!(sink.contents(), "2024-05-01T14:30:00+02:00 [ping] status=200\n");
    }

    #[test]
    fn test_label_column() {
        let (sink, writer) = capture();
        let writer = writer.with_label("poller");

        writer.write(&Ping { at: at(), status: 503 }).unwrap();
        assert_eq!(sink.contents(), "2024-05-01T12:30:00Z [poller] [ping] status=503\n");
    }

    #[test]
    fn test_hidden_columns() {
        let (sink, writer) = capture();
        let writer = writer
            .with_show_timestamp(false)
            .with_show_label(false)
            .with_label("poller");

        writer.write(&Ping { at: at(), status: 200 }).unwrap();
        assert_eq!(sink.contents(), "[ping] status=200\n");
    }

    #[test]
    fn test_text_writable_wins_over_display() {
        let (sink, writer) = capture();
        let writer = writer.with_show_timestamp(false);

        writer.write(&Request { at: at(), status: 404 }).unwrap();
        assert_eq!(sink.contents(), "[http.request] GET /health 404\n");
    }

    #[test]
    fn test_event_without_body() {
        let (sink, writer) = capture();
        writer.write(&Bare).unwrap();
        assert_eq!(sink.contents(), "2024-05-01T12:30:00Z [debug] \n");
    }

    #[test]
    fn test_colored_columns() {
        let sink = MemorySink::new();
        let writer = TextWriter::new(InterlockedWriter::new(sink.clone())).with_label("app");

        writer.write(&Ping { at: at(), status: 200 }).unwrap();
        assert_eq!(
            sink.contents(),
            "\x1b[90m2024-05-01T12:30:00Z\x1b[0m [\x1b[34mapp\x1b[0m] [\x1b[37mping\x1b[0m] status=200\n"
        );
    }

    #[test]
    fn test_color_provider_and_fallback_lookup() {
        let sink = MemorySink::new();
        let writer = TextWriter::new(InterlockedWriter::new(sink.clone()))
            .with_show_timestamp(false)
            .with_flag_color("ping", AnsiColor::GREEN);

        writer.write(&Request { at: at(), status: 200 }).unwrap();
        writer.write(&Ping { at: at(), status: 200 }).unwrap();
        writer
            .write(&MessageEvent::new(Flag::WARNING, "slow").with_timestamp(at()))
            .unwrap();

        assert_eq!(
            sink.lines(),
            vec![
                "[\x1b[36mhttp.request\x1b[0m] GET /health \x1b[32m200\x1b[0m".to_string(),
                "[\x1b[32mping\x1b[0m] status=200".to_string(),
                "[\x1b[33mwarning\x1b[0m] slow".to_string(),
            ]
        );
    }

    #[test]
    fn test_error_output_falls_back_to_primary() {
        let (sink, writer) = capture();
        let writer = writer.with_show_timestamp(false);
        assert!(writer.error_output().same_sink(writer.output()));

        writer.write_error(&ErrorEvent::fatal("disk full")).unwrap();
        assert_eq!(sink.contents(), "[fatal] disk full\n");
    }

    #[test]
    fn test_error_output_is_separate_when_set() {
        let (out, writer) = capture();
        let err = MemorySink::new();
        let writer = writer
            .with_show_timestamp(false)
            .with_error_output(InterlockedWriter::new(err.clone()));

        writer.write(&MessageEvent::new(Flag::INFO, "ok")).unwrap();
        writer.write_error(&MessageEvent::new(Flag::ERROR, "bad")).unwrap();

        assert_eq!(out.contents(), "[info] ok\n");
        assert_eq!(err.contents(), "[error] bad\n");
    }

    #[test]
    fn test_sink_error_propagates_and_buffer_returns() {
        let pool = BufferPool::new(4);
        let writer = TextWriter::new(InterlockedWriter::new(FailingSink))
            .with_buffer_pool(pool.clone());

        let err = writer.write(&MessageEvent::new(Flag::INFO, "lost")).unwrap_err();
        assert_eq!(err.as_label(), "writer_io");
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn test_strftime_format_and_invalid_fallback() {
        let format = TimeFormat::from_pattern("%Y/%m/%d %H:%M");
        assert_eq!(format.format(&at()), "2024/05/01 12:30");

        let invalid = TimeFormat::from_pattern("%Q");
        assert_eq!(invalid.format(&at()), "2024-05-01T12:30:00Z");

        assert_eq!(TimeFormat::from_pattern("  "), TimeFormat::Rfc3339);
        assert_eq!(TimeFormat::from_pattern("RFC3339"), TimeFormat::Rfc3339);
    }

    #[test]
    fn test_formatter_passthrough_without_color() {
        let (_, writer) = capture();
        assert_eq!(writer.colorize("x", AnsiColor::RED), "x");
        assert_eq!(writer.colorize_status_code(500), "500");
        assert_eq!(writer.colorize_by_status_code(500, "boom"), "boom");

        let writer = writer.with_use_color(true);
        assert_eq!(writer.colorize_by_status_code(500, "boom"), "\x1b[31mboom\x1b[0m");
    }

    #[test]
    fn test_concurrent_writes_produce_whole_lines() {
        let (sink, writer) = capture();
        let writer = Arc::new(writer.with_show_timestamp(false));

        let handles: Vec<_> = ["left", "right"]
            .into_iter()
            .map(|name| {
                let writer = Arc::clone(&writer);
                std::thread::spawn(move || {
                    let body = name.repeat(50);
                    for _ in 0..200 {
                        writer
                            .write(&MessageEvent::new(Flag::INFO, body.clone()))
                            .unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let lines = sink.lines();
        assert_eq!(lines.len(), 400);
        let left = format!("[info] {}", "left".repeat(50));
        let right = format!("[info] {}", "right".repeat(50));
        assert!(lines.iter().all(|l| *l == left || *l == right));
    }
}
