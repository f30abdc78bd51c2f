//! Output sinks: the `Sink` trait, the file sink with rotation, a buffered
//! wrapper, a console sink, and the fan-out dispatcher that ties them
//! together.

pub mod async_sink;
pub mod buffered;
pub mod fanout;
pub mod file;

use crate::error::Result;
use std::io::Write;
use std::sync::Mutex;

/// A single output destination. Implementations must be safe to call from
/// any thread — [`fanout::FanOut`] holds a shared lock while writing to
/// every registered sink in turn.
pub trait Sink: Send + Sync {
    /// Writes one formatted record. `data` carries no trailing newline —
    /// formatters hand back just the record's bytes (spec: the object form's
    /// "terminating newline omitted — callers append it") — and every
    /// built-in sink appends its own `\n` after writing `data`.
    fn write(&self, data: &[u8]) -> Result<()>;

    fn flush(&self) -> Result<()>;

    /// Flushes and releases any resources. Idempotent: closing twice must
    /// not error.
    fn close(&self) -> Result<()>;
}

/// Writes records to standard output. Used when no file sink is configured
/// and `auto_sink` is enabled (spec's zero-configuration default).
pub struct ConsoleSink {
    stdout: Mutex<std::io::Stdout>,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self {
            stdout: Mutex::new(std::io::stdout()),
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for ConsoleSink {
    fn write(&self, data: &[u8]) -> Result<()> {
        let mut out = self.stdout.lock().unwrap_or_else(|e| e.into_inner());
        out.write_all(data)?;
        out.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        let mut out = self.stdout.lock().unwrap_or_else(|e| e.into_inner());
        out.flush()?;
        Ok(())
    }

    fn close(&self) -> Result<()> {
        self.flush()
    }
}
