//! # Worker: one listener, one queue, one loop.
//!
//! A [`Worker`] owns a bounded FIFO queue of events and a dedicated tokio task
//! that feeds them to a single [`Listener`].
//!
//! ## Lifecycle
//! ```text
//!   NotStarted ──start──► Running ──stop──► Stopped ──close──► Closed
//!       │                   ▲                  │                 ▲
//!       │                   └──────start───────┘                 │
//!       └────────────────────────────close───────────────────────┘
//! ```
//!
//! ## Loop
//! ```text
//! loop {
//!   select (abort first) {
//!     abort.cancelled()  ─► exit, hand the queue back (acknowledgment)
//!     queue.recv()       ─► process(event)   // fault boundary
//!   }
//! }
//! ```
//!
//! ## Rules
//! - Events are processed in enqueue order.
//! - `stop` returns only after the loop has exited, so any in-flight `process`
//!   has completed; nothing is processed afterwards unless `drain` or `start` is called.
//! - `drain` = `stop`, then process whatever is queued on the caller's task
//!   (best effort against concurrent producers).
//! - `stop`/`drain` have no timeout: a listener call that never returns stalls them.
//! - Listener panics and errors are caught and handed to the parent [`FatalSink`]
//!   (or discarded when there is none); the loop keeps going.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use fanlog::{EventRef, Flag, ListenerFn, MessageEvent, Worker};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let worker = Worker::new(ListenerFn::arc("print", |ev: &EventRef| {
//!     println!("{}", ev.flag());
//!     Ok(())
//! }));
//! worker.start().await.unwrap();
//! worker.try_enqueue(Arc::new(MessageEvent::new(Flag::INFO, "hi"))).unwrap();
//! worker.drain().await;
//! worker.close().await;
//! # }
//! ```

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use parking_lot::{Mutex, RwLock};
use tokio::sync::{Mutex as AsyncMutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::listener::{FatalSink, Listener};
use crate::error::WorkerError;
use crate::events::EventRef;

/// Lifecycle state of a [`Worker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Created; events may be enqueued but nothing processes them yet.
    NotStarted,
    /// The loop task is running.
    Running,
    /// The loop exited; queued events are retained.
    Stopped,
    /// Terminal: queue released, enqueue rejected.
    Closed,
}

/// Listener plus fault reporting, shared with the loop task.
struct Core {
    listener: Arc<dyn Listener>,
    parent: Option<Arc<dyn FatalSink>>,
}

impl Core {
    /// Invokes the listener inside the fault boundary.
    async fn invoke(&self, event: &EventRef) -> Result<(), WorkerError> {
        let listener = self.listener.name();
        match AssertUnwindSafe(self.listener.on_event(event))
            .catch_unwind()
            .await
        {
            Ok(Ok(())) => Ok(()),
            Ok(Err(source)) => Err(WorkerError::ListenerFailed { listener, source }),
            Err(payload) => Err(WorkerError::ListenerPanicked {
                listener,
                info: panic_message(payload.as_ref()),
            }),
        }
    }

    async fn process(&self, event: EventRef) {
        let Err(err) = self.invoke(&event).await else {
            return;
        };
        let Some(parent) = &self.parent else {
            tracing::debug!(listener = err.listener(), error = ?err, "listener failure discarded");
            return;
        };
        if let Err(payload) = AssertUnwindSafe(parent.sync_fatal(&err))
            .catch_unwind()
            .await
        {
            tracing::error!(
                listener = err.listener(),
                error = ?err,
                panic = %panic_message(payload.as_ref()),
                "fatal sink panicked while reporting listener failure"
            );
        }
    }
}

/// Handle on a running loop task.
struct RunningLoop {
    abort: CancellationToken,
    handle: JoinHandle<mpsc::Receiver<EventRef>>,
}

/// Lifecycle-owned parts, guarded by one async mutex so start/stop/drain/close serialize.
struct Control {
    queue: Option<mpsc::Receiver<EventRef>>,
    running: Option<RunningLoop>,
}

/// Per-listener bounded queue with a dedicated processing loop.
///
/// All methods take `&self`; share the worker as `Arc<Worker>`.
/// Lifecycle calls (`start`, `stop`, `drain`, `close`) serialize with each other;
/// enqueueing never waits for them.
pub struct Worker {
    core: Arc<Core>,
    capacity: usize,
    sender: RwLock<Option<mpsc::Sender<EventRef>>>,
    control: AsyncMutex<Control>,
    state: Mutex<WorkerState>,
}

impl Worker {
    /// Creates a worker without a parent sink; listener faults are discarded.
    #[must_use]
    pub fn new(listener: Arc<dyn Listener>) -> Self {
        Self::build(listener, None)
    }

    /// Creates a worker reporting listener faults to `parent`.
    #[must_use]
    pub fn with_parent(listener: Arc<dyn Listener>, parent: Arc<dyn FatalSink>) -> Self {
        Self::build(listener, Some(parent))
    }

    fn build(listener: Arc<dyn Listener>, parent: Option<Arc<dyn FatalSink>>) -> Self {
        let capacity = listener.queue_capacity().max(1);
        let (tx, rx) = mpsc::channel::<EventRef>(capacity);
        Self {
            core: Arc::new(Core { listener, parent }),
            capacity,
            sender: RwLock::new(Some(tx)),
            control: AsyncMutex::new(Control {
                queue: Some(rx),
                running: None,
            }),
            state: Mutex::new(WorkerState::NotStarted),
        }
    }

    /// Name of the served listener.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.core.listener.name()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> WorkerState {
        *self.state.lock()
    }

    /// True while the loop task is running.
    pub fn is_running(&self) -> bool {
        self.state() == WorkerState::Running
    }

    /// Queue capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of events currently queued (0 once closed).
    pub fn queued(&self) -> usize {
        self.sender
            .read()
            .as_ref()
            .map_or(0, |tx| tx.max_capacity() - tx.capacity())
    }

    fn set_state(&self, state: WorkerState) {
        *self.state.lock() = state;
    }

    /// Spawns the processing loop on the current tokio runtime.
    ///
    /// - `Running` → no-op.
    /// - `NotStarted`/`Stopped` → spawns the loop over the retained queue.
    /// - `Closed` → `WorkerError::Closed`.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    pub async fn start(&self) -> Result<(), WorkerError> {
        let mut control = self.control.lock().await;
        if control.running.is_some() {
            return Ok(());
        }
        let Some(queue) = control.queue.take() else {
            return Err(WorkerError::Closed {
                listener: self.name(),
            });
        };

        let abort = CancellationToken::new();
        let handle = tokio::spawn(process_loop(Arc::clone(&self.core), queue, abort.clone()));
        control.running = Some(RunningLoop { abort, handle });
        self.set_state(WorkerState::Running);
        Ok(())
    }

    /// Runs the listener on one event inside the fault boundary.
    ///
    /// Failures go to the parent sink (or are discarded); this never panics
    /// because of the listener.
    pub async fn process(&self, event: EventRef) {
        self.core.process(event).await;
    }

    /// Like [`process`](Self::process), but failures are only traced, never sent
    /// to the parent sink. Used by the parent itself to deliver fatal reports.
    pub(crate) async fn process_unreported(&self, event: EventRef) {
        if let Err(err) = self.core.invoke(&event).await {
            tracing::error!(listener = err.listener(), error = ?err, "fatal report delivery failed");
        }
    }

    /// Signals the loop to exit and waits until it has.
    ///
    /// No-op unless running.
    pub async fn stop(&self) {
        let mut control = self.control.lock().await;
        self.stop_locked(&mut control).await;
    }

    async fn stop_locked(&self, control: &mut Control) {
        let Some(running) = control.running.take() else {
            return;
        };
        running.abort.cancel();
        match running.handle.await {
            Ok(queue) => {
                control.queue = Some(queue);
                self.set_state(WorkerState::Stopped);
            }
            Err(err) => {
                tracing::error!(listener = self.name(), error = %err, "worker loop did not exit cleanly; closing");
                self.sender.write().take();
                self.set_state(WorkerState::Closed);
            }
        }
    }

    /// Stops the loop, then processes every queued event on the caller's task.
    ///
    /// Events enqueued concurrently with the drain may or may not be processed.
    pub async fn drain(&self) {
        let mut control = self.control.lock().await;
        self.stop_locked(&mut control).await;
        let Some(queue) = control.queue.as_mut() else {
            return;
        };
        while let Ok(event) = queue.try_recv() {
            self.core.process(event).await;
        }
    }

    /// Stops the loop and releases the queue. Queued events are discarded;
    /// call [`drain`](Self::drain) first to keep them.
    ///
    /// Closing an already closed worker is a no-op.
    pub async fn close(&self) {
        let mut control = self.control.lock().await;
        if self.state() == WorkerState::Closed {
            return;
        }
        self.stop_locked(&mut control).await;
        self.sender.write().take();
        control.queue = None;
        self.set_state(WorkerState::Closed);
    }

    /// Enqueues without waiting.
    ///
    /// Returns `QueueFull` when no slot is free and `Closed` after [`close`](Self::close).
    pub fn try_enqueue(&self, event: EventRef) -> Result<(), WorkerError> {
        let listener = self.name();
        let sender = self.sender.read();
        let Some(tx) = sender.as_ref() else {
            return Err(WorkerError::Closed { listener });
        };
        tx.try_send(event).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => WorkerError::QueueFull { listener },
            mpsc::error::TrySendError::Closed(_) => WorkerError::Closed { listener },
        })
    }

    /// Enqueues, waiting for a free slot when the queue is full.
    pub async fn enqueue(&self, event: EventRef) -> Result<(), WorkerError> {
        let listener = self.name();
        let tx = self
            .sender
            .read()
            .clone()
            .ok_or(WorkerError::Closed { listener })?;
        tx.send(event)
            .await
            .map_err(|_| WorkerError::Closed { listener })
    }
}

impl fmt::Debug for Worker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Worker")
            .field("listener", &self.name())
            .field("state", &self.state())
            .field("capacity", &self.capacity)
            .finish()
    }
}

/// The worker loop; returns the queue when aborted.
async fn process_loop(
    core: Arc<Core>,
    mut queue: mpsc::Receiver<EventRef>,
    abort: CancellationToken,
) -> mpsc::Receiver<EventRef> {
    loop {
        tokio::select! {
            biased;
            _ = abort.cancelled() => break,
            next = queue.recv() => match next {
                Some(event) => core.process(event).await,
                None => break,
            },
        }
    }
    queue
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
