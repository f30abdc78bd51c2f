//! Callback system for log events
//!
//! Allows hosts to hook into record emission and internal exceptions.
//! Callbacks run synchronously, in the caller's thread, immediately before
//! fan-out — they are not the per-sink write-error callback (that one lives
//! on `LoggerConfig::write_error_callback`, see spec §6/§4.6).

use crate::level::Severity;
use crate::record::Record;
use parking_lot::RwLock;
use std::sync::Arc;

/// Executed for each record; a non-`Ok` return is collected but never
/// aborts the pipeline.
pub type LogCallback = Arc<dyn Fn(&Record) -> Result<(), String> + Send + Sync>;

/// Customizes color formatting for a severity/message pair.
pub type ColorCallback = Arc<dyn Fn(Severity, &str) -> String + Send + Sync>;

/// Invoked when the logger catches an internal exception (a sink write that
/// panicked or returned an error the logger chose to swallow per
/// `enable_exception_handling`).
pub type ExceptionCallback = Arc<dyn Fn(&str, &str) + Send + Sync>;

/// Thread-safe collection of the three callback kinds above.
#[derive(Clone)]
pub struct CallbackManager {
    log_callbacks: Arc<RwLock<Vec<LogCallback>>>,
    color_callbacks: Arc<RwLock<Vec<ColorCallback>>>,
    exception_callbacks: Arc<RwLock<Vec<ExceptionCallback>>>,
}

impl CallbackManager {
    pub fn new() -> Self {
        Self {
            log_callbacks: Arc::new(RwLock::new(Vec::new())),
            color_callbacks: Arc::new(RwLock::new(Vec::new())),
            exception_callbacks: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn add_log_callback(&self, callback: LogCallback) {
        self.log_callbacks.write().push(callback);
    }

    pub fn add_color_callback(&self, callback: ColorCallback) {
        self.color_callbacks.write().push(callback);
    }

    pub fn add_exception_callback(&self, callback: ExceptionCallback) {
        self.exception_callbacks.write().push(callback);
    }

    /// Runs every log callback, returning the error strings from any that failed.
    pub fn execute_log_callbacks(&self, record: &Record) -> Vec<String> {
        let callbacks = self.log_callbacks.read();
        let mut errors = Vec::new();

        for callback in callbacks.iter() {
            if let Err(e) = callback(record) {
                errors.push(e);
            }
        }

        errors
    }

    pub fn execute_color_callbacks(&self, level: Severity, message: &str) -> Option<String> {
        let callbacks = self.color_callbacks.read();
        callbacks.first().map(|callback| callback(level, message))
    }

    pub fn execute_exception_callbacks(&self, error: &str, backtrace: &str) {
        let callbacks = self.exception_callbacks.read();

        for callback in callbacks.iter() {
            callback(error, backtrace);
        }
    }

    pub fn clear_log_callbacks(&self) {
        self.log_callbacks.write().clear();
    }

    pub fn clear_color_callbacks(&self) {
        self.color_callbacks.write().clear();
    }

    pub fn clear_exception_callbacks(&self) {
        self.exception_callbacks.write().clear();
    }

    pub fn clear_all(&self) {
        self.clear_log_callbacks();
        self.clear_color_callbacks();
        self.clear_exception_callbacks();
    }
}

impl Default for CallbackManager {
    fn default() -> Self {
        Self::new()
    }
}
