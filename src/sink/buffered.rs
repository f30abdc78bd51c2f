//! Buffered sink wrapper
//!
//! Wraps any [`Sink`] with a user-sized buffer (4 KiB by default). Writes
//! that fit are accumulated; a write that would overflow the buffer flushes
//! first, then either buffers (if it now fits alone) or is written straight
//! through (if it's larger than the buffer itself). Documented as
//! unsuitable for audit-grade records, since a crash between buffering and
//! flush loses the buffered tail.

use super::Sink;
use crate::error::Result;
use parking_lot::Mutex;

pub const DEFAULT_BUFFER_SIZE: usize = 4096;

pub struct BufferedSink<S: Sink> {
    inner: S,
    capacity: usize,
    buffer: Mutex<Vec<u8>>,
}

impl<S: Sink> BufferedSink<S> {
    pub fn new(inner: S) -> Self {
        Self::with_capacity(inner, DEFAULT_BUFFER_SIZE)
    }

    pub fn with_capacity(inner: S, capacity: usize) -> Self {
        Self {
            inner,
            capacity,
            buffer: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    fn flush_locked(&self, buffer: &mut Vec<u8>) -> Result<()> {
        if buffer.is_empty() {
            return Ok(());
        }
        self.inner.write(buffer)?;
        buffer.clear();
        Ok(())
    }
}

impl<S: Sink> Sink for BufferedSink<S> {
    fn write(&self, data: &[u8]) -> Result<()> {
        let mut buffer = self.buffer.lock();

        if data.len() > self.capacity {
            self.flush_locked(&mut buffer)?;
            return self.inner.write(data);
        }

        if buffer.len() + data.len() + 1 > self.capacity {
            self.flush_locked(&mut buffer)?;
        }

        if !buffer.is_empty() {
            buffer.push(b'\n');
        }
        buffer.extend_from_slice(data);
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        let mut buffer = self.buffer.lock();
        self.flush_locked(&mut buffer)?;
        self.inner.flush()
    }

    fn close(&self) -> Result<()> {
        self.flush()?;
        self.inner.close()
    }
}
