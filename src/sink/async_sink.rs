//! Async write wrapper: hands formatted records to a bounded channel and
//! lets a single background thread drain them into the wrapped sink, so the
//! calling thread never blocks on file I/O.
//!
//! Ordering is preserved for a single producer thread (the channel is FIFO
//! and there is exactly one consumer), matching spec §5's "within a single
//! sink, records from any one thread appear in program order" even though
//! writes are no longer synchronous with the caller.

use super::Sink;
use crate::error::{LoglyError, Result};
use crossbeam_channel::{Sender, bounded};
use std::sync::Arc;
use std::thread::JoinHandle;

enum Message {
    Write(Vec<u8>),
    Flush,
}

/// Wraps a sink so writes are queued on a bounded channel and performed by
/// a dedicated background thread. `close()` drains the queue, joins the
/// thread, then closes the wrapped sink.
pub struct AsyncSink {
    sender: std::sync::Mutex<Option<Sender<Message>>>,
    worker: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl AsyncSink {
    /// `capacity` bounds how many pending writes may queue before `write`
    /// blocks the caller (back-pressure, not data loss).
    pub fn new<S: Sink + 'static>(inner: S, capacity: usize) -> Self {
        let inner = Arc::new(inner);
        let (sender, receiver) = bounded::<Message>(capacity.max(1));

        let worker_inner = Arc::clone(&inner);
        let worker = std::thread::spawn(move || {
            while let Ok(message) = receiver.recv() {
                match message {
                    Message::Write(data) => {
                        let _ = worker_inner.write(&data);
                    }
                    Message::Flush => {
                        let _ = worker_inner.flush();
                    }
                }
            }
            let _ = worker_inner.flush();
        });

        Self {
            sender: std::sync::Mutex::new(Some(sender)),
            worker: std::sync::Mutex::new(Some(worker)),
        }
    }

    fn send(&self, message: Message) -> Result<()> {
        let guard = self.sender.lock().unwrap_or_else(|e| e.into_inner());
        match guard.as_ref() {
            Some(sender) => sender.send(message).map_err(|_| LoglyError::ChannelSend),
            None => Err(LoglyError::ChannelSend),
        }
    }
}

impl Sink for AsyncSink {
    fn write(&self, data: &[u8]) -> Result<()> {
        self.send(Message::Write(data.to_vec()))
    }

    fn flush(&self) -> Result<()> {
        self.send(Message::Flush)
    }

    /// Idempotent: the sender is taken on first call, so a second `close`
    /// finds nothing left to drop and simply joins (or no-ops if already
    /// joined) the worker thread.
    fn close(&self) -> Result<()> {
        self.sender.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(worker) = self.worker.lock().unwrap_or_else(|e| e.into_inner()).take() {
            let _ = worker.join();
        }
        Ok(())
    }
}
