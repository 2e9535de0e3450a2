//! # Listeners and the workers that serve them.
//!
//! A [`Listener`] consumes events; a [`Worker`] gives it a bounded queue and a
//! dedicated loop so a slow or failing listener never blocks producers or
//! other listeners.
//!
//! ## Architecture
//! ```text
//! Logger::trigger(event)
//!     ├──► Worker(stdout) ──► [queue] ──► loop ──► WriterListener::on_event()
//!     ├──► Worker(audit)  ──► [queue] ──► loop ──► AuditListener::on_event()
//!     └──► Worker(...)    ──► [queue] ──► loop ──► ...
//!                                           │
//!                                  panic / Err ──► FatalSink::sync_fatal()
//! ```
//!
//! ## Contents
//! - [`Listener`], [`FatalSink`] the consumer and fault-report traits
//! - [`ListenerFn`], [`WriterListener`] ready-made listeners
//! - [`Worker`], [`WorkerState`] the per-listener queue and loop

mod listener;
mod listener_fn;
mod worker;

pub use listener::{DEFAULT_WORKER_QUEUE_DEPTH, FatalSink, Listener};
pub use listener_fn::{ListenerFn, WriterListener};
pub use worker::{Worker, WorkerState};
