//! Logger configuration with comprehensive settings
//!
//! `LoggerConfig` is the construction-time snapshot every `Logger` holds
//! under `Arc<RwLock<..>>` (mirroring the teacher's own pattern) and swaps
//! wholesale on `configure()`/config-file reload.

use crate::error::{LoglyError, Result};
use crate::level::Severity;
use crate::sink::Sink;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Output encoding for every sink that doesn't override it locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Object,
}

/// Redaction aggressiveness (spec §4.2). `Basic` is the default — the safer
/// of the two inconsistent defaults the original design left open (see
/// DESIGN.md, Open Question #1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedactionMode {
    Disabled,
    Basic,
    Full,
}

/// Overflow behavior for the rate limiter (spec §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitStrategy {
    /// Silently discard anything past the bucket's capacity.
    Drop,
    /// Admit one in every `n` overflowing records.
    Sample(u32),
    /// Documented as "semantically slow to steady state"; implemented as
    /// `Drop` in the hot path, since blocking inside a log call is not
    /// acceptable (spec §4.4).
    Throttle,
}

/// File-path constraints and rotation knobs for the file sink (spec §6).
#[derive(Debug, Clone)]
pub struct FileConfig {
    pub path: PathBuf,
    pub max_size_mb: f64,
    pub max_backups: usize,
    pub max_age: Option<std::time::Duration>,
    pub compress: bool,
    /// Queue writes onto a background thread instead of writing synchronously
    /// with the caller (spec §5's async-write opt-in, layered on top of the
    /// synchronous default rather than replacing it).
    pub async_write: bool,
    /// Bound on how many pending writes may queue before the caller blocks.
    pub async_queue_capacity: usize,
}

impl FileConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_size_mb: 100.0,
            max_backups: 5,
            max_age: None,
            compress: false,
            async_write: false,
            async_queue_capacity: 1000,
        }
    }
}

/// Sensitive-content policy (spec §4.2, §6's `security` section).
#[derive(Clone)]
pub struct SecurityConfig {
    pub mode: RedactionMode,
    /// Source strings for custom patterns; compiled and ReDoS-checked when
    /// the logger is constructed (`crate::redact::PatternSet::with_custom`).
    pub custom_patterns: Vec<String>,
    pub max_record_bytes: usize,
    pub field_redaction: bool,
    /// Safety cap on an explicit repetition upper bound in a custom
    /// pattern's source string (spec §4.2).
    pub max_repetition: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            mode: RedactionMode::Basic,
            custom_patterns: Vec::new(),
            max_record_bytes: 5 * 1024 * 1024,
            field_redaction: true,
            max_repetition: 1000,
        }
    }
}

/// Token-bucket rate limiting (spec §4.4, §6's `rateLimit` section).
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub max_messages: u32,
    pub max_bytes: u64,
    pub burst_size: u32,
    pub strategy: RateLimitStrategy,
    pub sampling_rate: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_messages: 0,
            max_bytes: 0,
            burst_size: 0,
            strategy: RateLimitStrategy::Drop,
            sampling_rate: 10,
        }
    }
}

impl RateLimitConfig {
    /// A zero/negative bound disables that dimension (spec §4.4, "Nil-safe").
    pub fn is_disabled(&self) -> bool {
        self.max_messages == 0 && self.max_bytes == 0
    }
}

/// Key-name mapping and pretty-print toggle for object-form output (spec §4.3).
#[derive(Debug, Clone)]
pub struct ObjectFormConfig {
    pub pretty: bool,
    pub indent: usize,
    pub field_names: FieldNameMapping,
}

impl Default for ObjectFormConfig {
    fn default() -> Self {
        Self {
            pretty: false,
            indent: 2,
            field_names: FieldNameMapping::default(),
        }
    }
}

/// Object-form top-level key names. Defaults match spec §4.3 exactly.
#[derive(Debug, Clone)]
pub struct FieldNameMapping {
    pub timestamp: String,
    pub level: String,
    pub caller: String,
    pub message: String,
    pub fields: String,
}

impl Default for FieldNameMapping {
    fn default() -> Self {
        Self {
            timestamp: "timestamp".to_string(),
            level: "level".to_string(),
            caller: "caller".to_string(),
            message: "message".to_string(),
            fields: "fields".to_string(),
        }
    }
}

/// Callback invoked once per sink write failure: `(sink, error)` (spec §6).
pub type WriteErrorCallback = Arc<dyn Fn(&dyn Sink, &LoglyError) + Send + Sync>;

/// Hook invoked after a `Fatal` record has been dispatched to every sink.
/// The default terminates the process with exit code 1 after a best-effort
/// flush (spec §4.1).
pub type FatalHandler = Arc<dyn Fn() + Send + Sync>;

#[derive(Clone)]
pub struct LoggerConfig {
    pub level: Severity,
    pub format: OutputFormat,
    /// Empty means RFC3339 (spec §6).
    pub time_format: String,
    pub include_time: bool,
    pub include_level: bool,
    pub include_caller: bool,
    pub full_path: bool,
    pub dynamic_caller: bool,
    pub color: bool,
    pub file: Option<FileConfig>,
    pub security: SecurityConfig,
    pub rate_limit: RateLimitConfig,
    pub object_form: ObjectFormConfig,
    pub write_error_callback: Option<WriteErrorCallback>,
    pub fatal_handler: Option<FatalHandler>,
    pub enable_callbacks: bool,
    pub enable_exception_handling: bool,
    pub enable_version_check: bool,
    pub auto_sink: bool,
    pub debug_mode: bool,
    pub debug_log_file: Option<PathBuf>,
    pub level_colors: HashMap<Severity, String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        let mut level_colors = HashMap::new();
        for level in Severity::all() {
            level_colors.insert(level, level.default_color().to_string());
        }

        Self {
            level: Severity::Info,
            format: OutputFormat::Text,
            time_format: String::new(),
            include_time: true,
            include_level: true,
            include_caller: false,
            full_path: false,
            dynamic_caller: false,
            color: true,
            file: None,
            security: SecurityConfig::default(),
            rate_limit: RateLimitConfig::default(),
            object_form: ObjectFormConfig::default(),
            write_error_callback: None,
            fatal_handler: None,
            enable_callbacks: true,
            enable_exception_handling: true,
            enable_version_check: true,
            auto_sink: true,
            debug_mode: false,
            debug_log_file: None,
            level_colors,
        }
    }
}

impl LoggerConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(ref file) = self.file {
            crate::sink::file::validate_path(&file.path)?;
        }
        if !self.time_format.is_empty() && self.time_format.contains('\0') {
            return Err(LoglyError::InvalidConfig(
                "time format must not contain NUL".to_string(),
            ));
        }
        Ok(())
    }
}
