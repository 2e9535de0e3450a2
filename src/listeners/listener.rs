//! # Listener and parent sink traits.
//!
//! [`Listener`] is the extension point for consuming events. Each listener is
//! served by its own [`Worker`](crate::Worker):
//! - **Dedicated worker task** (runs independently of other listeners)
//! - **Per-listener bounded queue** (capacity via [`Listener::queue_capacity`])
//! - **Fault isolation** (panics and errors are caught and reported to the parent
//!   [`FatalSink`], never to the producer)
//!
//! ## Architecture
//! ```text
//! producer ──► [bounded queue] ──► worker task ──► listener.on_event()
//!                                              └─► panic / Err → FatalSink::sync_fatal()
//! ```
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use fanlog::{EventRef, Listener, ListenerError};
//!
//! struct Counter(std::sync::atomic::AtomicU64);
//!
//! #[async_trait]
//! impl Listener for Counter {
//!     async fn on_event(&self, _event: &EventRef) -> Result<(), ListenerError> {
//!         self.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
//!         Ok(())
//!     }
//!
//!     fn name(&self) -> &'static str { "counter" }
//!     fn queue_capacity(&self) -> usize { 4096 }
//! }
//! ```

use async_trait::async_trait;

use crate::error::{ListenerError, WorkerError};
use crate::events::EventRef;

/// Default depth of a listener's queue.
pub const DEFAULT_WORKER_QUEUE_DEPTH: usize = 1 << 20;

/// Event consumer served by a dedicated worker.
///
/// ### Implementation requirements
/// - One worker invokes a listener sequentially (FIFO), but the same listener
///   value may be shared by several workers and must then be `Sync` in practice.
/// - Return errors instead of panicking; both are isolated, but errors carry context.
/// - A call that never returns stalls its worker's `stop`/`drain` indefinitely.
#[async_trait]
pub trait Listener: Send + Sync + 'static {
    /// Handles one event.
    async fn on_event(&self, event: &EventRef) -> Result<(), ListenerError>;

    /// Name used in diagnostics and failure reports.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Capacity of this listener's queue. Clamped to a minimum of 1.
    ///
    /// Default: [`DEFAULT_WORKER_QUEUE_DEPTH`].
    fn queue_capacity(&self) -> usize {
        DEFAULT_WORKER_QUEUE_DEPTH
    }
}

/// Receives listener faults caught by a worker's fault boundary.
///
/// Called inline from the worker loop, so it may be invoked concurrently by
/// several workers.
#[async_trait]
pub trait FatalSink: Send + Sync + 'static {
    /// Reports a fault at fatal severity; returns once the report is delivered.
    async fn sync_fatal(&self, err: &WorkerError);
}
