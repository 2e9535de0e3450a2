//! Dispatcher: the flag filter in front of the listener workers.
//!
//! This module exposes [`Logger`], which owns:
//! - [`dispatch`]: the runtime flag set, the `(flag, name)` listener registry,
//!   non-blocking and inline dispatch, and fatal reporting for worker faults.

mod dispatch;

pub use dispatch::{DEFAULT_WRITER_LISTENER_NAME, Logger};
