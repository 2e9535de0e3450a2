//! # fanlog
//!
//! **fanlog** is an in-process, asynchronous structured-event logging core.
//!
//! Producers hand events to a dispatcher; the dispatcher filters them by flag
//! and fans them out to listeners, each served by its own bounded queue and
//! worker task. A pooled, color-aware text writer renders events as lines.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   producer   producer   producer
//!      │          │          │
//!      ▼          ▼          ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Logger                                                      │
//! │  - FlagSet (all / none / per-flag overrides)                 │
//! │  - registry: flag ─► name ─► Worker                          │
//! └──────┬─────────────────────┬──────────────────────┬──────────┘
//!        ▼                     ▼                      ▼
//!   ┌──────────┐          ┌──────────┐           ┌──────────┐
//!   │ Worker   │          │ Worker   │           │ Worker   │
//!   │ [queue]  │          │ [queue]  │           │ [queue]  │
//!   │ loop     │          │ loop     │           │ loop     │
//!   └────┬─────┘          └────┬─────┘           └────┬─────┘
//!        ▼                     ▼                      ▼
//!  WriterListener          ListenerFn             custom Listener
//!        │
//!        ▼
//!   TextWriter ── BufferPool lease ── render ── InterlockedWriter (stdout / stderr)
//! ```
//!
//! ### Line format
//! ```text
//! <timestamp> [<label>] [<flag>] <body>\n
//! ```
//! Timestamp and label columns are optional; the flag is always present.
//!
//! ## Features
//! | Area              | Description                                               | Key types / traits                          |
//! |-------------------|-----------------------------------------------------------|---------------------------------------------|
//! | **Flags**         | Decide which event categories are dispatched.             | [`Flag`], [`FlagSet`]                       |
//! | **Events**        | Contract for logged values plus ready-made events.        | [`Event`], [`MessageEvent`], [`ErrorEvent`] |
//! | **Listeners**     | Consume events on isolated, bounded workers.              | [`Listener`], [`Worker`], [`ListenerFn`]    |
//! | **Writers**       | Render events to colored text lines.                      | [`Writer`], [`TextWriter`]                  |
//! | **Dispatch**      | Filter and fan out events; report listener faults.        | [`Logger`], [`FatalSink`]                   |
//! | **Configuration** | Read `LOG_*` environment variables.                       | [`Config`]                                  |
//! | **Errors**        | Typed errors for sinks, listeners and workers.            | [`WriterError`], [`ListenerError`], [`WorkerError`] |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use fanlog::{Config, Flag, InterlockedWriter, Logger, MemorySink, MessageEvent, TextWriter};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), fanlog::WorkerError> {
//! let sink = MemorySink::new();
//! let cfg = Config {
//!     use_color: false,
//!     show_timestamp: false,
//!     label: "poller".into(),
//!     ..Config::default()
//! };
//! let writer = TextWriter::from_config(&cfg).with_output(InterlockedWriter::new(sink.clone()));
//!
//! let log = Logger::new(cfg.flags.clone()).with_writer(writer).await?;
//! log.trigger(Arc::new(MessageEvent::new(Flag::INFO, "started")));
//! log.debug("filtered out by the default flags");
//! log.close().await;
//!
//! assert_eq!(sink.lines(), vec!["[poller] [info] started"]);
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod events;
mod flags;
mod listeners;
mod logger;
mod writers;

// ---- Public re-exports ----

pub use config::{
    Config, ENV_VAR_LABEL, ENV_VAR_LOG_EVENTS, ENV_VAR_SHOW_LABEL, ENV_VAR_SHOW_TIMESTAMP,
    ENV_VAR_TIME_FORMAT, ENV_VAR_USE_COLOR,
};
pub use error::{ListenerError, WorkerError, WriterError};
pub use events::{ErrorEvent, Event, EventRef, FlagTextColorProvider, MessageEvent, TextWritable};
pub use flags::{Flag, FlagSet};
pub use listeners::{
    DEFAULT_WORKER_QUEUE_DEPTH, FatalSink, Listener, ListenerFn, Worker, WorkerState,
    WriterListener,
};
pub use logger::{DEFAULT_WRITER_LISTENER_NAME, Logger};
pub use writers::{
    AnsiColor, BufferPool, DEFAULT_BUFFER_POOL_SIZE, DEFAULT_TEXT_WRITER_SHOW_LABEL,
    DEFAULT_TEXT_WRITER_SHOW_TIMESTAMP, DEFAULT_TEXT_WRITER_USE_COLOR, FlagTextColors,
    InterlockedWriter, MAX_RETAINED_BYTES, MemorySink, PooledBuffer, TextFormatter, TextWriter,
    TimeFormat, Writer, colorize_by_status_code, colorize_status_code, status_code_color,
};
