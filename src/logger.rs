//! Ingress and level gate: the primary `Logger` type
//!
//! `Logger::log` is the single entry point every per-severity convenience
//! method funnels into. The severity threshold lives in an `AtomicU8` so it
//! can be checked before anything else — allocation, redaction, formatting
//! — happens. A logger with no sinks, or one below threshold, costs one
//! atomic load and nothing more.

use crate::caller;
use crate::callback::{CallbackManager, ColorCallback, ExceptionCallback, LogCallback};
use crate::config::{FatalHandler, LoggerConfig, WriteErrorCallback};
use crate::config_file::ConfigFileLoader;
use crate::error::{LoglyError, Result};
use crate::format::Formatter;
use crate::level::Severity;
use crate::ratelimit::{Admission, RateLimiter};
use crate::record::{Field, Record};
use crate::redact::Redactor;
use crate::sink::fanout::FanOut;
use crate::sink::{ConsoleSink, Sink};
use crate::version::VersionChecker;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

/// Per-call context available to a [`LevelResolver`].
pub struct LogContext<'a> {
    pub severity: Severity,
    pub message: &'a str,
}

/// Overrides the effective threshold for one call, e.g. to force-enable
/// verbose logging for a single tagged request. Returning `None` leaves the
/// logger's own threshold in effect.
pub trait LevelResolver: Fn(&LogContext) -> Option<Severity> + Send + Sync {}
impl<T: Fn(&LogContext) -> Option<Severity> + Send + Sync> LevelResolver for T {}

pub struct Logger {
    config: Arc<RwLock<LoggerConfig>>,
    threshold: AtomicU8,
    closed: AtomicBool,
    fanout: Arc<FanOut>,
    redactor: RwLock<Arc<Redactor>>,
    rate_limiter: RwLock<Arc<RateLimiter>>,
    formatter: RwLock<Arc<Formatter>>,
    callbacks: Arc<CallbackManager>,
    bound_fields: RwLock<Vec<Field>>,
    level_resolver: RwLock<Option<Arc<dyn LevelResolver>>>,
    fatal_handler: RwLock<Option<FatalHandler>>,
    config_file_loader: RwLock<ConfigFileLoader>,
    version_checker: RwLock<VersionChecker>,
    auto_sink_initialized: AtomicBool,
}

impl Logger {
    pub fn new() -> Self {
        let config_loader = ConfigFileLoader::new();
        let config = config_loader.load().ok().flatten().unwrap_or_default();
        Self::build(config, config_loader)
    }

    pub fn with_config(config: LoggerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, ConfigFileLoader::new()))
    }

    pub fn with_config_file(path: std::path::PathBuf) -> Result<Self> {
        let mut config_loader = ConfigFileLoader::new();
        config_loader.set_custom_path(path);
        let config = config_loader.load()?.unwrap_or_default();
        Ok(Self::build(config, config_loader))
    }

    fn build(config: LoggerConfig, config_loader: ConfigFileLoader) -> Self {
        let redactor = Redactor::new(&config.security).unwrap_or_else(|e| {
            eprintln!("[LOGLY WARNING] security config rejected ({e}), falling back to disabled redaction");
            Redactor::new(&crate::config::SecurityConfig {
                mode: crate::config::RedactionMode::Disabled,
                ..crate::config::SecurityConfig::default()
            })
            .expect("disabled redactor always constructs")
        });

        let callbacks = Arc::new(CallbackManager::new());
        let on_write_error = wrap_write_error_callback(
            config.write_error_callback.clone(),
            Arc::clone(&callbacks),
            config.enable_exception_handling,
        );

        let logger = Self {
            threshold: AtomicU8::new(config.level.priority()),
            closed: AtomicBool::new(false),
            fanout: Arc::new(FanOut::new(Some(on_write_error))),
            redactor: RwLock::new(Arc::new(redactor)),
            rate_limiter: RwLock::new(Arc::new(RateLimiter::new(config.rate_limit))),
            formatter: RwLock::new(Arc::new(Formatter::new(config.time_format.clone()))),
            callbacks,
            bound_fields: RwLock::new(Vec::new()),
            level_resolver: RwLock::new(None),
            fatal_handler: RwLock::new(config.fatal_handler.clone()),
            version_checker: RwLock::new(VersionChecker::new(config.enable_version_check)),
            auto_sink_initialized: AtomicBool::new(false),
            config: Arc::new(RwLock::new(config)),
            config_file_loader: RwLock::new(config_loader),
        };

        let enable_version_check = logger.config.read().enable_version_check;
        if enable_version_check {
            if let Ok(Some(msg)) = logger.version_checker.read().check_for_updates() {
                eprintln!("{msg}");
            }
        }

        if logger.config.read().auto_sink {
            logger.initialize_auto_sink();
        }

        if let Some(file_cfg) = logger.config.read().file.clone() {
            logger.initialize_file_sink(&file_cfg);
        }

        logger
    }

    /// Wires the `file` section of the configuration (spec §6) into an
    /// actual rotating [`crate::sink::file::FileSink`] added to the
    /// fan-out, optionally queued through [`crate::sink::async_sink::AsyncSink`]
    /// when `async_write` is set. A construction-time failure here (bad
    /// path, permissions, symlink target) is reported and otherwise
    /// swallowed — like the redactor fallback above, a misconfigured file
    /// sink degrades the logger rather than aborting it, matching this
    /// crate's "construction never panics" policy.
    fn initialize_file_sink(&self, file_cfg: &crate::config::FileConfig) {
        match crate::sink::file::FileSink::new(
            file_cfg.path.clone(),
            file_cfg.max_size_mb,
            file_cfg.max_backups,
            file_cfg.max_age,
            file_cfg.compress,
        ) {
            Ok(sink) => {
                if file_cfg.async_write {
                    let async_sink = crate::sink::async_sink::AsyncSink::new(
                        sink,
                        file_cfg.async_queue_capacity,
                    );
                    self.fanout.add(Arc::new(async_sink));
                } else {
                    self.fanout.add(Arc::new(sink));
                }
            }
            Err(e) => {
                eprintln!(
                    "[LOGLY WARNING] failed to initialize configured file sink at {} ({e}), continuing without it",
                    file_cfg.path.display()
                );
            }
        }
    }

    fn initialize_auto_sink(&self) {
        if self
            .auto_sink_initialized
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }
        self.fanout.add(Arc::new(ConsoleSink::new()));
        if self.config.read().debug_mode {
            eprintln!("[LOGLY DEBUG] auto-sink (console) initialized");
        }
    }

    /// Swaps in a new configuration, rebuilding the redactor/rate
    /// limiter/formatter and updating the atomic threshold. Existing sinks
    /// are left untouched — `configure` affects the pipeline, not what's
    /// already been wired up with `add_sink`.
    pub fn configure(&self, config: LoggerConfig) -> Result<()> {
        config.validate()?;

        let redactor = Redactor::new(&config.security)?;
        *self.redactor.write() = Arc::new(redactor);
        *self.rate_limiter.write() = Arc::new(RateLimiter::new(config.rate_limit));
        *self.formatter.write() = Arc::new(Formatter::new(config.time_format.clone()));
        self.threshold.store(config.level.priority(), Ordering::Relaxed);
        *self.fatal_handler.write() = config.fatal_handler.clone();

        let auto_sink = config.auto_sink;
        *self.config.write() = config;

        if auto_sink {
            self.initialize_auto_sink();
        }

        Ok(())
    }

    pub fn disable_config_file_scan(&self) {
        self.config_file_loader.write().disable_scan();
    }

    pub fn set_level_resolver(&self, resolver: Arc<dyn LevelResolver>) {
        *self.level_resolver.write() = Some(resolver);
    }

    pub fn clear_level_resolver(&self) {
        *self.level_resolver.write() = None;
    }

    pub fn set_threshold(&self, level: Severity) {
        self.threshold.store(level.priority(), Ordering::Relaxed);
        self.config.write().level = level;
    }

    pub fn add_sink(&self, sink: Arc<dyn Sink>) -> usize {
        self.fanout.add(sink);
        self.fanout.len() - 1
    }

    pub fn remove_sink(&self, index: usize) -> bool {
        self.fanout.remove_at(index).is_some()
    }

    pub fn sink_count(&self) -> usize {
        self.fanout.len()
    }

    /// Cumulative count of records denied by the rate limiter since
    /// construction (spec §6: "get rate-limiter statistics").
    pub fn rate_limit_dropped_count(&self) -> u64 {
        self.rate_limiter.read().dropped_count()
    }

    pub fn bind(&self, field: Field) {
        let mut bound = self.bound_fields.write();
        bound.retain(|f| f.name != field.name);
        bound.push(field);
    }

    pub fn unbind(&self, name: &str) {
        self.bound_fields.write().retain(|f| f.name != name);
    }

    pub fn clear_bindings(&self) {
        self.bound_fields.write().clear();
    }

    pub fn add_log_callback<F>(&self, callback: F)
    where
        F: Fn(&Record) -> std::result::Result<(), String> + Send + Sync + 'static,
    {
        let cb: LogCallback = Arc::new(callback);
        self.callbacks.add_log_callback(cb);
    }

    pub fn add_color_callback<F>(&self, callback: F)
    where
        F: Fn(Severity, &str) -> String + Send + Sync + 'static,
    {
        let cb: ColorCallback = Arc::new(callback);
        self.callbacks.add_color_callback(cb);
    }

    pub fn add_exception_callback<F>(&self, callback: F)
    where
        F: Fn(&str, &str) + Send + Sync + 'static,
    {
        let cb: ExceptionCallback = Arc::new(callback);
        self.callbacks.add_exception_callback(cb);
    }

    pub fn clear_callbacks(&self) {
        self.callbacks.clear_all();
    }

    /// Generic entry point every per-severity convenience method funnels
    /// into. Returns `Ok(())` for records gated out by level, rate limiting,
    /// or a closed logger — only sink/construction-level failures surface
    /// as `Err`, and even those only when `enable_exception_handling` is
    /// off.
    pub fn log(&self, severity: Severity, message: impl Into<String>, fields: Vec<Field>) -> Result<()> {
        if self.closed.load(Ordering::Relaxed) {
            return Ok(());
        }

        let stored_threshold = self.threshold.load(Ordering::Relaxed);

        // Fast path: with no resolver registered, the stored threshold is
        // the only gate there is, so it can be checked — and the record
        // rejected — before `message.into()` ever allocates (spec §4.1:
        // "no allocation beyond argument evaluation" below threshold).
        let resolver = self.level_resolver.read().clone();
        if resolver.is_none() && severity.priority() < stored_threshold {
            return Ok(());
        }

        let message = message.into();

        // The resolver, when present, yields a per-call threshold that
        // fully replaces the stored one (spec §4.1: "a per-call threshold
        // override") rather than merely adding a further restriction on
        // top of it.
        let effective_threshold = match resolver {
            Some(resolver) => {
                let ctx = LogContext { severity, message: message.as_str() };
                resolver(&ctx).map(|s| s.priority()).unwrap_or(stored_threshold)
            }
            None => stored_threshold,
        };
        if severity.priority() < effective_threshold {
            return Ok(());
        }

        if self.fanout.is_empty() {
            return Ok(());
        }

        let config = Arc::clone(&self.config);
        let (dynamic_caller, full_path, debug_mode, enable_callbacks) = {
            let c = config.read();
            (c.dynamic_caller, c.full_path, c.debug_mode, c.enable_callbacks)
        };

        let mut record = Record::new(severity, message);
        record.fields.extend(self.bound_fields.read().iter().cloned());
        record.fields.extend(fields);

        if dynamic_caller {
            record.caller = caller::detect(full_path);
        }

        let redactor = self.redactor.read().clone();
        redactor.redact(&mut record);

        let formatter = self.formatter.read().clone();
        let formatted = formatter.format(&record, &config.read());

        let limiter = self.rate_limiter.read().clone();
        let now_secs = record.timestamp.timestamp().max(0) as u64;
        if limiter.check(formatted.len() as u64, now_secs) == Admission::Deny {
            if debug_mode {
                eprintln!("[LOGLY DEBUG] record dropped by rate limiter");
            }
            return Ok(());
        }

        if enable_callbacks {
            for error in self.callbacks.execute_log_callbacks(&record) {
                if debug_mode {
                    eprintln!("[LOGLY DEBUG] log callback error: {error}");
                }
            }
        }

        self.fanout.dispatch(formatted.as_bytes());

        if severity == Severity::Fatal {
            self.run_fatal_handler();
        }

        Ok(())
    }

    fn run_fatal_handler(&self) {
        self.fanout.flush_all();
        if let Some(handler) = self.fatal_handler.read().clone() {
            handler();
        } else {
            std::process::exit(1);
        }
    }

    pub fn debug(&self, message: impl Into<String>) -> Result<()> {
        self.log(Severity::Debug, message, Vec::new())
    }

    pub fn info(&self, message: impl Into<String>) -> Result<()> {
        self.log(Severity::Info, message, Vec::new())
    }

    pub fn warn(&self, message: impl Into<String>) -> Result<()> {
        self.log(Severity::Warn, message, Vec::new())
    }

    pub fn error(&self, message: impl Into<String>) -> Result<()> {
        self.log(Severity::Error, message, Vec::new())
    }

    pub fn fatal(&self, message: impl Into<String>) -> Result<()> {
        self.log(Severity::Fatal, message, Vec::new())
    }

    pub fn enable_debug(&self) {
        self.config.write().debug_mode = true;
    }

    pub fn disable_debug(&self) {
        self.config.write().debug_mode = false;
    }

    pub fn check_version(&self) -> Result<Option<String>> {
        self.version_checker.read().check_for_updates()
    }

    pub fn current_version(&self) -> &'static str {
        VersionChecker::current_version()
    }

    /// Flushes, closes every sink in reverse registration order, and marks
    /// the logger inert. Idempotent.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.fanout.close_all();
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.close();
    }
}

/// Builds the callback handed to [`FanOut`]: always forwards to the user's
/// own `write_error_callback` (if any), and additionally routes the error
/// through `CallbackManager`'s exception callbacks when
/// `enable_exception_handling` is on.
fn wrap_write_error_callback(
    user_callback: Option<WriteErrorCallback>,
    callbacks: Arc<CallbackManager>,
    enable_exception_handling: bool,
) -> WriteErrorCallback {
    Arc::new(move |sink: &dyn Sink, err: &LoglyError| {
        if enable_exception_handling {
            callbacks.execute_exception_callbacks(&err.to_string(), "");
        }
        if let Some(ref user_callback) = user_callback {
            user_callback(sink, err);
        }
    })
}
