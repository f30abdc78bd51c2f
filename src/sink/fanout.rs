//! Ordered fan-out to every registered sink
//!
//! A shared (read) lock is held while writing to every sink — concurrent
//! writers don't block each other — and an exclusive lock is taken only to
//! add or remove a sink. A write error on one sink is reported through the
//! configured callback and does not stop the remaining sinks from
//! receiving the record.

use super::Sink;
use crate::config::WriteErrorCallback;
use crate::error::LoglyError;
use parking_lot::RwLock;
use std::sync::Arc;

pub struct FanOut {
    sinks: RwLock<Vec<Arc<dyn Sink>>>,
    on_write_error: Option<WriteErrorCallback>,
}

impl FanOut {
    pub fn new(on_write_error: Option<WriteErrorCallback>) -> Self {
        Self {
            sinks: RwLock::new(Vec::new()),
            on_write_error,
        }
    }

    pub fn add(&self, sink: Arc<dyn Sink>) {
        self.sinks.write().push(sink);
    }

    pub fn remove_at(&self, index: usize) -> Option<Arc<dyn Sink>> {
        let mut sinks = self.sinks.write();
        if index < sinks.len() {
            Some(sinks.remove(index))
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.sinks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Writes `data` to every registered sink, in registration order.
    /// Per-sink failures are reported through `on_write_error` and do not
    /// abort dispatch to the remaining sinks.
    pub fn dispatch(&self, data: &[u8]) {
        let sinks = self.sinks.read();
        for sink in sinks.iter() {
            if let Err(err) = sink.write(data) {
                self.report(sink.as_ref(), &err);
            }
        }
    }

    fn report(&self, sink: &dyn Sink, err: &LoglyError) {
        if let Some(ref callback) = self.on_write_error {
            callback(sink, err);
        }
    }

    /// Flushes every sink, reporting (but not aborting on) failures the
    /// same way [`Self::dispatch`] does.
    pub fn flush_all(&self) {
        let sinks = self.sinks.read();
        for sink in sinks.iter() {
            if let Err(err) = sink.flush() {
                self.report(sink.as_ref(), &err);
            }
        }
    }

    /// Closes every sink in reverse registration order, clearing the list.
    pub fn close_all(&self) {
        let mut sinks = self.sinks.write();
        for sink in sinks.iter().rev() {
            let _ = sink.close();
        }
        sinks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FailingSink;
    impl Sink for FailingSink {
        fn write(&self, _data: &[u8]) -> Result<()> {
            Err(LoglyError::Custom("boom".to_string()))
        }
        fn flush(&self) -> Result<()> {
            Ok(())
        }
        fn close(&self) -> Result<()> {
            Ok(())
        }
    }

    struct RecordingSink {
        received: Mutex<Vec<Vec<u8>>>,
    }
    impl Sink for RecordingSink {
        fn write(&self, data: &[u8]) -> Result<()> {
            self.received.lock().unwrap().push(data.to_vec());
            Ok(())
        }
        fn flush(&self) -> Result<()> {
            Ok(())
        }
        fn close(&self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn a_failing_sink_does_not_stop_dispatch_to_the_rest() {
        let errors = Arc::new(AtomicUsize::new(0));
        let errors_clone = Arc::clone(&errors);
        let fanout = FanOut::new(Some(Arc::new(move |_sink, _err| {
            errors_clone.fetch_add(1, Ordering::SeqCst);
        })));

        fanout.add(Arc::new(FailingSink));
        let recording = Arc::new(RecordingSink {
            received: Mutex::new(Vec::new()),
        });
        fanout.add(recording.clone());

        fanout.dispatch(b"hello");

        assert_eq!(errors.load(Ordering::SeqCst), 1);
        assert_eq!(recording.received.lock().unwrap().len(), 1);
    }

    #[test]
    fn remove_at_drops_the_requested_sink() {
        let fanout = FanOut::new(None);
        fanout.add(Arc::new(FailingSink));
        assert_eq!(fanout.len(), 1);
        assert!(fanout.remove_at(0).is_some());
        assert_eq!(fanout.len(), 0);
    }
}
