//! Pooled scratch buffers for the formatter's happy path
//!
//! A bounded free list of reusable `String` buffers. `take()` pops a buffer
//! (or allocates a fresh one if the pool is empty); `give_back()` clears and
//! returns it, unless the pool is already at its ceiling, in which case the
//! buffer is simply dropped rather than grown without bound.

use parking_lot::Mutex;

const DEFAULT_CEILING: usize = 64;
/// Buffers larger than this are dropped on return rather than pooled, so one
/// oversized record can't pin an oversized buffer in the pool forever.
const MAX_POOLED_CAPACITY: usize = 64 * 1024;

pub struct BufferPool {
    free: Mutex<Vec<String>>,
    ceiling: usize,
}

impl BufferPool {
    pub fn new() -> Self {
        Self::with_ceiling(DEFAULT_CEILING)
    }

    pub fn with_ceiling(ceiling: usize) -> Self {
        Self {
            free: Mutex::new(Vec::with_capacity(ceiling.min(16))),
            ceiling,
        }
    }

    pub fn take(&self) -> String {
        self.free.lock().pop().unwrap_or_default()
    }

    pub fn give_back(&self, mut buf: String) {
        if buf.capacity() > MAX_POOLED_CAPACITY {
            return;
        }
        buf.clear();
        let mut free = self.free.lock();
        if free.len() < self.ceiling {
            free.push(buf);
        }
    }

    pub fn len(&self) -> usize {
        self.free.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}
