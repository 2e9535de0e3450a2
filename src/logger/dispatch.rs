//! # Logger: flag filter plus per-listener workers.
//!
//! [`Logger`] is the dispatcher tying the other pieces together. It owns the
//! runtime [`FlagSet`] and one [`Worker`] per registered listener.
//!
//! ## Architecture
//! ```text
//! trigger(event)
//!   ├─► flags.is_enabled(event.flag())?  no ─► dropped
//!   └─► workers under event.flag() + workers under `all`
//!         └─► worker.try_enqueue(event)   full/closed ─► dropped + tracing::warn!
//!
//! worker fault ─► Logger::sync_fatal(err)
//!                   └─► ErrorEvent(fatal) delivered inline to `fatal` + `all` listeners
//!                       (delivery failures are traced, never re-reported)
//! ```
//!
//! ## Rules
//! - `trigger` never waits: a full queue drops the event for that listener only.
//! - Listeners are keyed by `(flag, name)`; registering the same key again
//!   replaces the previous listener after draining it.
//! - `close` drains every worker, then closes it and forgets it.

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::config::Config;
use crate::error::WorkerError;
use crate::events::{ErrorEvent, Event, EventRef, MessageEvent};
use crate::flags::{Flag, FlagSet};
use crate::listeners::{FatalSink, Listener, Worker, WriterListener};
use crate::writers::{TextWriter, Writer};

/// Listener name used by [`Logger::with_writer`].
pub const DEFAULT_WRITER_LISTENER_NAME: &str = "writer";

type Registry = BTreeMap<Flag, BTreeMap<String, Arc<Worker>>>;

/// Event dispatcher.
///
/// Always handled as `Arc<Logger>`; workers report listener faults back to it
/// through a weak reference.
///
/// ## Example
/// ```rust
/// use std::sync::Arc;
/// use fanlog::{Flag, InterlockedWriter, Logger, MemorySink, MessageEvent, TextWriter};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), fanlog::WorkerError> {
/// let sink = MemorySink::new();
/// let writer = TextWriter::new(InterlockedWriter::new(sink.clone()))
///     .with_use_color(false)
///     .with_show_timestamp(false);
///
/// let log = Logger::all().with_writer(writer).await?;
/// log.trigger(Arc::new(MessageEvent::new(Flag::INFO, "ready")));
/// log.close().await;
///
/// assert_eq!(sink.lines(), vec!["[info] ready"]);
/// # Ok(())
/// # }
/// ```
pub struct Logger {
    me: Weak<Logger>,
    flags: RwLock<FlagSet>,
    listeners: RwLock<Registry>,
}

impl Logger {
    /// Creates a logger dispatching the flags enabled in `flags`.
    #[must_use]
    pub fn new(flags: FlagSet) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            flags: RwLock::new(flags),
            listeners: RwLock::new(BTreeMap::new()),
        })
    }

    /// Creates a logger with every flag enabled.
    #[must_use]
    pub fn all() -> Arc<Self> {
        Self::new(FlagSet::all())
    }

    /// Creates a logger with every flag disabled.
    #[must_use]
    pub fn none() -> Arc<Self> {
        Self::new(FlagSet::none())
    }

    /// Creates a logger from `cfg` with a [`TextWriter`] on stdout/stderr.
    pub async fn from_config(cfg: &Config) -> Result<Arc<Self>, WorkerError> {
        Self::new(cfg.flags.clone())
            .with_writer(TextWriter::from_config(cfg))
            .await
    }

    /// Creates a logger from the `LOG_*` environment variables.
    pub async fn from_env() -> Result<Arc<Self>, WorkerError> {
        Self::from_config(&Config::from_env()).await
    }

    /// Registers `writer` under `all` as the [`DEFAULT_WRITER_LISTENER_NAME`] listener.
    ///
    /// Error flags go to the writer's error output.
    pub async fn with_writer<W: Writer>(self: Arc<Self>, writer: W) -> Result<Arc<Self>, WorkerError> {
        self.listen(
            Flag::ALL,
            DEFAULT_WRITER_LISTENER_NAME,
            Arc::new(WriterListener::new(DEFAULT_WRITER_LISTENER_NAME, Arc::new(writer))),
        )
        .await?;
        Ok(self)
    }

    // === flags ===

    /// Snapshot of the current flag set.
    pub fn flags(&self) -> FlagSet {
        self.flags.read().clone()
    }

    /// Replaces the flag set.
    pub fn set_flags(&self, flags: FlagSet) {
        *self.flags.write() = flags;
    }

    /// Enables `flag`.
    pub fn enable(&self, flag: impl Into<Flag>) {
        self.flags.write().enable(flag);
    }

    /// Disables `flag`.
    pub fn disable(&self, flag: impl Into<Flag>) {
        self.flags.write().disable(flag);
    }

    /// True if events with `flag` are dispatched.
    pub fn is_enabled(&self, flag: &Flag) -> bool {
        self.flags.read().is_enabled(flag)
    }

    // === listeners ===

    /// Registers `listener` for `flag` under `name` and starts its worker.
    ///
    /// Use [`Flag::ALL`] to receive every dispatched event. An existing listener
    /// with the same `(flag, name)` is drained and closed.
    pub async fn listen(
        &self,
        flag: impl Into<Flag>,
        name: impl Into<String>,
        listener: Arc<dyn Listener>,
    ) -> Result<(), WorkerError> {
        let worker = Arc::new(Worker::with_parent(
            listener,
            Arc::new(ParentSink(self.me.clone())),
        ));
        worker.start().await?;

        let replaced = self
            .listeners
            .write()
            .entry(flag.into())
            .or_default()
            .insert(name.into(), worker);

        if let Some(old) = replaced {
            old.drain().await;
            old.close().await;
        }
        Ok(())
    }

    /// Drains, closes and forgets the listener `(flag, name)`.
    ///
    /// Returns `false` when no such listener exists.
    pub async fn remove_listener(&self, flag: &Flag, name: &str) -> bool {
        let removed = {
            let mut listeners = self.listeners.write();
            let removed = listeners.get_mut(flag).and_then(|named| named.remove(name));
            if listeners.get(flag).is_some_and(BTreeMap::is_empty) {
                listeners.remove(flag);
            }
            removed
        };

        match removed {
            Some(worker) => {
                worker.drain().await;
                worker.close().await;
                true
            }
            None => false,
        }
    }

    /// True if a listener `(flag, name)` is registered.
    pub fn has_listener(&self, flag: &Flag, name: &str) -> bool {
        self.listeners
            .read()
            .get(flag)
            .is_some_and(|named| named.contains_key(name))
    }

    /// True if any listener is registered for `flag` (not counting `all`).
    pub fn has_listeners(&self, flag: &Flag) -> bool {
        self.listeners.read().contains_key(flag)
    }

    /// Workers receiving events with `flag`: those registered for it, then those under `all`.
    fn workers_for(&self, flag: &Flag) -> Vec<Arc<Worker>> {
        let listeners = self.listeners.read();
        let mut workers = Vec::new();
        if let Some(named) = listeners.get(flag) {
            workers.extend(named.values().cloned());
        }
        if *flag != Flag::ALL {
            if let Some(named) = listeners.get(&Flag::ALL) {
                workers.extend(named.values().cloned());
            }
        }
        workers
    }

    fn all_workers(&self) -> Vec<Arc<Worker>> {
        self.listeners
            .read()
            .values()
            .flat_map(|named| named.values().cloned())
            .collect()
    }

    // === dispatch ===

    /// Enqueues `event` on every matching worker without waiting.
    ///
    /// Disabled flags are dropped up front. A full or closed queue drops the
    /// event for that listener only.
    pub fn trigger(&self, event: EventRef) {
        let flag = event.flag();
        if !self.is_enabled(&flag) {
            return;
        }
        for worker in self.workers_for(&flag) {
            if let Err(err) = worker.try_enqueue(Arc::clone(&event)) {
                tracing::warn!(
                    listener = err.listener(),
                    flag = %flag,
                    reason = err.as_label(),
                    "event dropped"
                );
            }
        }
    }

    /// Wraps `event` and [`trigger`](Self::trigger)s it.
    pub fn write<E: Event>(&self, event: E) {
        self.trigger(Arc::new(event));
    }

    /// Delivers `event` to every matching listener on the caller's task, bypassing the queues.
    ///
    /// Listener faults are still isolated and reported as fatal events.
    pub async fn sync_trigger(&self, event: EventRef) {
        let flag = event.flag();
        if !self.is_enabled(&flag) {
            return;
        }
        for worker in self.workers_for(&flag) {
            worker.process(Arc::clone(&event)).await;
        }
    }

    /// Triggers an `info` message.
    pub fn info(&self, message: impl Into<Arc<str>>) {
        self.write(MessageEvent::new(Flag::INFO, message));
    }

    /// Triggers a `warning` message.
    pub fn warning(&self, message: impl Into<Arc<str>>) {
        self.write(MessageEvent::new(Flag::WARNING, message));
    }

    /// Triggers a `debug` message.
    pub fn debug(&self, message: impl Into<Arc<str>>) {
        self.write(MessageEvent::new(Flag::DEBUG, message));
    }

    /// Triggers an `error` event describing `err` and its sources.
    pub fn error(&self, err: &(dyn std::error::Error + 'static)) {
        self.write(ErrorEvent::from_error(Flag::ERROR, err));
    }

    /// Delivers a `fatal` event describing `err` inline and returns once delivered.
    pub async fn sync_fatal_error(&self, err: &(dyn std::error::Error + 'static)) {
        self.sync_trigger(Arc::new(ErrorEvent::from_error(Flag::FATAL, err)))
            .await;
    }

    // === lifecycle ===

    /// Flushes every queue, then resumes the workers.
    pub async fn drain(&self) {
        for worker in self.all_workers() {
            worker.drain().await;
            if let Err(err) = worker.start().await {
                tracing::debug!(listener = err.listener(), error = %err, "worker not resumed after drain");
            }
        }
    }

    /// Drains every worker, then closes them and forgets all listeners.
    ///
    /// The registry stays populated while draining, so listener faults raised
    /// by the final events still reach the `fatal` listeners.
    pub async fn close(&self) {
        for worker in self.all_workers() {
            worker.drain().await;
        }

        let workers: Vec<_> = std::mem::take(&mut *self.listeners.write())
            .into_values()
            .flat_map(BTreeMap::into_values)
            .collect();
        for worker in workers {
            // picks up anything enqueued between the drain and the take
            worker.drain().await;
            worker.close().await;
        }
    }
}

#[async_trait]
impl FatalSink for Logger {
    async fn sync_fatal(&self, err: &WorkerError) {
        if !self.is_enabled(&Flag::FATAL) {
            return;
        }
        let workers = self.workers_for(&Flag::FATAL);
        if workers.is_empty() {
            tracing::warn!(listener = err.listener(), error = ?err, "no fatal listener registered; fault dropped");
            return;
        }
        let event: EventRef = Arc::new(ErrorEvent::from_error(Flag::FATAL, err));
        for worker in workers {
            worker.process_unreported(Arc::clone(&event)).await;
        }
    }
}

/// Parent sink handed to workers; holds the logger weakly so workers never keep it alive.
struct ParentSink(Weak<Logger>);

#[async_trait]
impl FatalSink for ParentSink {
    async fn sync_fatal(&self, err: &WorkerError) {
        match self.0.upgrade() {
            Some(logger) => logger.sync_fatal(err).await,
            None => tracing::debug!(listener = err.listener(), error = %err, "logger gone; fault dropped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use parking_lot::Mutex;

    use super::*;
    use crate::error::ListenerError;
    use crate::listeners::ListenerFn;
    use crate::writers::{InterlockedWriter, MemorySink};

    fn text_writer(sink: &MemorySink) -> TextWriter {
        TextWriter::new(InterlockedWriter::new(sink.clone()))
            .with_use_color(false)
            .with_show_timestamp(false)
    }

    fn collector(name: &'static str) -> (Arc<Mutex<Vec<String>>>, Arc<dyn Listener>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let listener: Arc<dyn Listener> = ListenerFn::arc(name, move |ev: &EventRef| {
            let body = ev.as_display().map(|d| d.to_string()).unwrap_or_default();
            sink.lock().push(format!("{}:{body}", ev.flag()));
            Ok(())
        });
        (seen, listener)
    }

    #[tokio::test]
    async fn test_trigger_respects_flag_set() {
        let sink = MemorySink::new();
        let log = Logger::new(FlagSet::default_flags())
            .with_writer(text_writer(&sink))
            .await
            .unwrap();

        log.info("shown");
        log.debug("hidden");
        log.enable(Flag::DEBUG);
        log.debug("now shown");
        log.disable(Flag::INFO);
        log.info("hidden again");
        log.close().await;

        assert_eq!(sink.lines(), vec!["[info] shown", "[debug] now shown"]);
    }

    #[tokio::test]
    async fn test_flag_listeners_and_all_listeners() {
        let log = Logger::all();
        let (pings, ping_listener) = collector("pings");
        let (every, all_listener) = collector("every");
        log.listen("ping", "pings", ping_listener).await.unwrap();
        log.listen(Flag::ALL, "every", all_listener).await.unwrap();
        assert!(log.has_listener(&Flag::new("ping"), "pings"));
        assert!(log.has_listeners(&Flag::new("ping")));
        assert!(!log.has_listener(&Flag::INFO, "pings"));

        log.trigger(Arc::new(MessageEvent::new("ping", "p1")));
        log.info("i1");
        log.close().await;

        assert_eq!(*pings.lock(), vec!["ping:p1"]);
        assert_eq!(*every.lock(), vec!["ping:p1", "info:i1"]);
    }

    #[tokio::test]
    async fn test_listener_fault_becomes_fatal_event() {
        let sink = MemorySink::new();
        let log = Logger::all().with_writer(text_writer(&sink)).await.unwrap();
        log.listen(
            "ping",
            "broken",
            ListenerFn::arc("broken", |_: &EventRef| Err(ListenerError::failed("no route"))),
        )
        .await
        .unwrap();

        log.trigger(Arc::new(MessageEvent::new("ping", "p")));
        tokio::time::timeout(Duration::from_secs(5), async {
            while !sink.contents().contains("[fatal]") {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .unwrap();
        log.close().await;

        let lines = sink.lines();
        assert!(lines.contains(&"[ping] p".to_string()));
        assert!(lines.contains(
            &"[fatal] listener 'broken' failed: listener failed: no route".to_string()
        ));
    }

    #[tokio::test]
    async fn test_close_reports_faults_from_final_drain() {
        let sink = MemorySink::new();
        let log = Logger::all().with_writer(text_writer(&sink)).await.unwrap();
        log.listen(
            "ping",
            "broken",
            ListenerFn::arc("broken", |_: &EventRef| Err(ListenerError::failed("no route"))),
        )
        .await
        .unwrap();

        // a stopped worker keeps the event queued until close drains it
        let broken = log
            .workers_for(&Flag::new("ping"))
            .into_iter()
            .find(|w| w.name() == "broken")
            .unwrap();
        broken.stop().await;

        log.trigger(Arc::new(MessageEvent::new("ping", "p")));
        log.close().await;

        let lines = sink.lines();
        assert!(lines.contains(&"[ping] p".to_string()), "{lines:?}");
        assert!(
            lines.contains(&"[fatal] listener 'broken' failed: listener failed: no route".to_string()),
            "{lines:?}"
        );
        assert!(!log.has_listeners(&Flag::new("ping")));
    }

    #[tokio::test]
    async fn test_failing_fatal_delivery_is_not_reported_again() {
        let log = Logger::all();
        let calls = Arc::new(Mutex::new(0usize));
        let counter = Arc::clone(&calls);
        log.listen(
            Flag::ALL,
            "always-fails",
            ListenerFn::arc("always-fails", move |_: &EventRef| {
                *counter.lock() += 1;
                Err(ListenerError::failed("nope"))
            }),
        )
        .await
        .unwrap();

        log.sync_trigger(Arc::new(MessageEvent::new(Flag::INFO, "x")))
            .await;

        // one call for the event, one for the fatal report of its failure
        assert_eq!(*calls.lock(), 2);
        log.close().await;
    }

    #[tokio::test]
    async fn test_replacing_and_removing_listeners() {
        let log = Logger::all();
        let (first, l1) = collector("c");
        let (second, l2) = collector("c");
        log.listen(Flag::INFO, "c", l1).await.unwrap();
        log.info("one");
        log.listen(Flag::INFO, "c", l2).await.unwrap();
        log.info("two");

        assert!(log.remove_listener(&Flag::INFO, "c").await);
        assert!(!log.remove_listener(&Flag::INFO, "c").await);
        assert!(!log.has_listeners(&Flag::INFO));
        log.info("three");

        assert_eq!(*first.lock(), vec!["info:one"]);
        assert_eq!(*second.lock(), vec!["info:two"]);
    }

    #[tokio::test]
    async fn test_drain_flushes_and_keeps_running() {
        let log = Logger::all();
        let (seen, listener) = collector("c");
        log.listen(Flag::ALL, "c", listener).await.unwrap();

        for i in 0..20 {
            log.info(i.to_string());
        }
        log.drain().await;
        assert_eq!(seen.lock().len(), 20);

        log.info("after drain");
        log.close().await;
        assert_eq!(seen.lock().len(), 21);
    }

    #[tokio::test]
    async fn test_full_queue_drops_for_that_listener_only() {
        let log = Logger::all();
        let (roomy_seen, roomy) = collector("roomy");
        let tiny = ListenerFn::new("tiny", |_: &EventRef| Ok(())).with_queue_capacity(1);
        log.listen(Flag::ALL, "roomy", roomy).await.unwrap();
        log.listen(Flag::ALL, "tiny", Arc::new(tiny)).await.unwrap();

        // a stopped worker keeps its queue, so the single slot fills up
        let tiny_worker = log
            .workers_for(&Flag::INFO)
            .into_iter()
            .find(|w| w.name() == "tiny")
            .unwrap();
        tiny_worker.stop().await;

        for i in 0..5 {
            log.info(i.to_string());
        }
        assert_eq!(tiny_worker.queued(), 1);
        log.close().await;
        assert_eq!(roomy_seen.lock().len(), 5);
    }

    #[tokio::test]
    async fn test_fatal_disabled_suppresses_fault_reports() {
        let sink = MemorySink::new();
        let mut flags = FlagSet::all();
        flags.disable(Flag::FATAL);
        let log = Logger::new(flags).with_writer(text_writer(&sink)).await.unwrap();
        log.listen(
            Flag::INFO,
            "broken",
            ListenerFn::arc("broken", |_: &EventRef| -> Result<(), ListenerError> {
                panic!("boom")
            }),
        )
        .await
        .unwrap();

        log.sync_trigger(Arc::new(MessageEvent::new(Flag::INFO, "x")))
            .await;
        log.close().await;
        assert_eq!(sink.lines(), vec!["[info] x"]);
    }
}
