//! Severity levels with priority-based ordering
//!
//! Five standard severities, totally ordered by priority. Threshold
//! comparisons use this numeric order; the gate in `Logger::log` rejects
//! any record whose severity is below the current threshold before doing
//! any other work.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a log record.
///
/// Ordered `Debug < Info < Warn < Error < Fatal`. The discriminant doubles
/// as the priority value used for threshold comparisons and for storing the
/// current threshold in a single `AtomicU8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Severity {
    Debug = 10,
    Info = 20,
    Warn = 30,
    Error = 40,
    Fatal = 50,
}

impl PartialOrd for Severity {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Severity {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (*self as u8).cmp(&(*other as u8))
    }
}

impl Severity {
    /// Label used by the text formatter (padded to 5 columns there).
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }

    pub fn priority(&self) -> u8 {
        *self as u8
    }

    pub fn default_color(&self) -> &'static str {
        match self {
            Severity::Debug => "34", // Blue
            Severity::Info => "37",  // White
            Severity::Warn => "33",  // Yellow
            Severity::Error => "31", // Red
            Severity::Fatal => "91", // Bright Red
        }
    }

    pub fn all() -> [Severity; 5] {
        [
            Severity::Debug,
            Severity::Info,
            Severity::Warn,
            Severity::Error,
            Severity::Fatal,
        ]
    }

    pub fn from_priority(priority: u8) -> Option<Self> {
        match priority {
            10 => Some(Severity::Debug),
            20 => Some(Severity::Info),
            30 => Some(Severity::Warn),
            40 => Some(Severity::Error),
            50 => Some(Severity::Fatal),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Severity {
    type Err = crate::error::LoglyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DEBUG" => Ok(Severity::Debug),
            "INFO" => Ok(Severity::Info),
            "WARN" | "WARNING" => Ok(Severity::Warn),
            "ERROR" => Ok(Severity::Error),
            "FATAL" => Ok(Severity::Fatal),
            _ => Err(crate::error::LoglyError::InvalidLevel(s.to_string())),
        }
    }
}
