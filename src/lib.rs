//! # logly
//!
//! Structured logging for server applications: level-gated ingress,
//! sensitive-data redaction, text/object formatting, fan-out to multiple
//! sinks, and a rotating/compressing file sink with rate limiting on the
//! write path.
//!
//! ## Architecture
//!
//! - [`level`] — the five-severity [`level::Severity`] scale and its
//!   priority ordering.
//! - [`record`] — the ephemeral [`record::Record`] type and its closed
//!   [`record::FieldValue`] set, built once per logging call.
//! - [`redact`] — always-on control-character sanitization plus
//!   mode-gated structural and pattern-based redaction.
//! - [`ratelimit`] — lock-free token-bucket admission control on the
//!   message and byte-rate dimensions.
//! - [`format`] — text and object (JSON) renderers, a pooled scratch
//!   buffer, and a per-second timestamp cache.
//! - [`caller`] — optional backtrace-based call-site detection.
//! - [`rotation`] — TOCTOU-safe file opening, size/age-triggered
//!   rotation, gzip compression with read-back verification.
//! - [`sink`] — the [`sink::Sink`] trait, a console sink, a rotating
//!   file sink, a buffering wrapper, and the [`sink::fanout::FanOut`]
//!   dispatcher.
//! - [`callback`] — user-registered log/color/exception callbacks.
//! - [`config`] / [`config_file`] — the [`config::LoggerConfig`]
//!   snapshot and its optional `logly.toml` loader.
//! - [`logger`] — [`logger::Logger`], the type every other module feeds
//!   into.
//! - [`global`] — a process-wide replaceable default logger.
//! - [`version`] — opt-in crates.io update notifications.
//!
//! ## Example
//!
//! ```no_run
//! use logly::prelude::*;
//!
//! let logger = Logger::new();
//! logger.info("service started").unwrap();
//! logger.log(Severity::Warn, "disk usage high", vec![Field::u64("percent", 92)]).unwrap();
//! ```

pub mod caller;
pub mod callback;
pub mod config;
pub mod config_file;
pub mod error;
pub mod format;
pub mod global;
pub mod level;
pub mod logger;
pub mod ratelimit;
pub mod record;
pub mod redact;
pub mod rotation;
pub mod sink;
pub mod version;

pub use config::{LoggerConfig, OutputFormat, RedactionMode};
pub use error::{LoglyError, Result};
pub use level::Severity;
pub use logger::Logger;
pub use record::{Field, FieldValue, Record};
pub use sink::buffered::BufferedSink;
pub use sink::file::FileSink;
pub use version::VersionChecker;

/// Re-exports the types most call sites need: `use logly::prelude::*;`.
pub mod prelude {
    pub use crate::config::{LoggerConfig, OutputFormat, RedactionMode};
    pub use crate::error::{LoglyError, Result};
    pub use crate::level::Severity;
    pub use crate::logger::Logger;
    pub use crate::record::{Field, FieldValue, Record};
    pub use crate::sink::buffered::BufferedSink;
    pub use crate::sink::file::FileSink;
    pub use crate::sink::{ConsoleSink, Sink};
}
