//! # Scratch buffer pool.
//!
//! [`BufferPool`] hands out reusable `String` buffers so rendering a line does
//! not allocate on the hot path. A lease is an RAII [`PooledBuffer`]: dropping
//! it clears the buffer and returns it to the pool, so release happens on every
//! exit path, including early returns and unwinding.
//!
//! ## Rules
//! - The pool keeps at most `capacity` idle buffers; extra returns are dropped.
//! - Buffers larger than [`MAX_RETAINED_BYTES`] are dropped instead of kept.
//! - Safe to lease and release from any number of threads.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use parking_lot::Mutex;

/// Default number of idle buffers kept by a pool.
pub const DEFAULT_BUFFER_POOL_SIZE: usize = 1 << 8;

/// Buffers that grew beyond this size are not returned to the pool.
pub const MAX_RETAINED_BYTES: usize = 64 * 1024;

const INITIAL_BUFFER_BYTES: usize = 256;

/// Pool of reusable text buffers. Cheap to clone (shared `Arc`).
#[derive(Clone, Debug)]
pub struct BufferPool {
    inner: Arc<PoolInner>,
}

#[derive(Debug)]
struct PoolInner {
    idle: Mutex<Vec<String>>,
    capacity: usize,
}

impl BufferPool {
    /// Creates a pool keeping up to `capacity` idle buffers (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(PoolInner {
                idle: Mutex::new(Vec::with_capacity(capacity)),
                capacity,
            }),
        }
    }

    /// Leases an empty buffer.
    pub fn lease(&self) -> PooledBuffer {
        let buf = self
            .inner
            .idle
            .lock()
            .pop()
            .unwrap_or_else(|| String::with_capacity(INITIAL_BUFFER_BYTES));
        PooledBuffer {
            buf,
            pool: Arc::clone(&self.inner),
        }
    }

    /// Number of idle buffers currently held.
    pub fn idle(&self) -> usize {
        self.inner.idle.lock().len()
    }

    /// Maximum number of idle buffers kept.
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_POOL_SIZE)
    }
}

impl PoolInner {
    fn release(&self, mut buf: String) {
        if buf.capacity() > MAX_RETAINED_BYTES {
            return;
        }
        buf.clear();
        let mut idle = self.idle.lock();
        if idle.len() < self.capacity {
            idle.push(buf);
        }
    }
}

/// A leased buffer; returns itself to its pool on drop.
#[derive(Debug)]
pub struct PooledBuffer {
    buf: String,
    pool: Arc<PoolInner>,
}

impl Deref for PooledBuffer {
    type Target = String;

    fn deref(&self) -> &String {
        &self.buf
    }
}

impl DerefMut for PooledBuffer {
    fn deref_mut(&mut self) -> &mut String {
        &mut self.buf
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buf));
    }
}
