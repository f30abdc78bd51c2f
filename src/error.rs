//! Error types and result handling
//!
//! Defines all error types that can occur in the logging library.
//! Uses thiserror for ergonomic error handling.

use std::io;
use thiserror::Error;

/// Result type alias using LoglyError
pub type Result<T> = std::result::Result<T, LoglyError>;

/// Main error type for the logging library.
///
/// Configuration errors are surfaced synchronously from construction; write
/// and rotation errors are delivered through callbacks and never propagate
/// to a logging call; redaction/path-validation errors are returned from the
/// registration/validation calls that produce them, not from `log()`.
#[derive(Error, Debug)]
pub enum LoglyError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    #[error("Sink not found: {0}")]
    SinkNotFound(usize),

    #[error("Invalid format string: {0}")]
    InvalidFormat(String),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Channel send error")]
    ChannelSend,

    #[error("Logger already initialized")]
    AlreadyInitialized,

    #[error("Callback execution error: {0}")]
    CallbackError(String),

    #[error("Version check error: {0}")]
    VersionCheckError(String),

    #[error("Pattern rejected: {0}")]
    UnsafePattern(String),

    #[error("Rotation error: {0}")]
    Rotation(String),

    #[error("Rejected path: {0}")]
    PathRejected(String),

    #[error("{0}")]
    Custom(String),
}

impl LoglyError {
    pub fn report_bug_message(&self) -> String {
        format!(
            "\n⚠️  An error occurred: {}\n\nIf you believe this is a bug in logly, please report it:\n  https://github.com/muhammad-fiaz/logly-rs/issues\n",
            self
        )
    }
}
