//! Advanced integration tests: redaction, sanitization, rotation, rate
//! limiting strategies, config-file loading, and the buffered sink wrapper.

use logly::config::{RateLimitConfig, RateLimitStrategy, SecurityConfig};
use logly::error::Result;
use logly::prelude::*;
use logly::redact::Redactor;
use logly::sink::buffered::BufferedSink;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

struct RecordingSink {
    lines: Mutex<Vec<String>>,
}

impl RecordingSink {
    fn new() -> Arc<Self> {
        Arc::new(Self { lines: Mutex::new(Vec::new()) })
    }

    fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl Sink for RecordingSink {
    fn write(&self, data: &[u8]) -> Result<()> {
        self.lines.lock().unwrap().push(String::from_utf8_lossy(data).into_owned());
        Ok(())
    }
    fn flush(&self) -> Result<()> {
        Ok(())
    }
    fn close(&self) -> Result<()> {
        Ok(())
    }
}

fn inert_logger() -> Logger {
    let mut config = LoggerConfig::default();
    config.auto_sink = false;
    config.color = false;
    config.enable_version_check = false;
    Logger::with_config(config).unwrap()
}

/// Redaction totality (property 2): in `full` mode nothing that looks like
/// a credit card, a JWT, or an IPv4 literal survives.
#[test]
fn full_mode_redaction_is_total_over_known_shapes() {
    let cfg = SecurityConfig {
        mode: RedactionMode::Full,
        ..SecurityConfig::default()
    };
    let redactor = Redactor::new(&cfg).unwrap();

    let mut record = Record::new(
        Severity::Info,
        "card 4111 1111 1111 1111 from 10.0.0.5 token eyJhbGciOiJIUzI1NiJ9.eyJzdWIiOiIxIn0.abc123sig",
    );
    redactor.redact(&mut record);

    assert!(!record.message.contains("4111 1111 1111 1111"));
    assert!(!record.message.contains("10.0.0.5"));
    assert!(!record.message.contains("eyJhbGciOiJIUzI1NiJ9"));
}

/// Field sanitization (property 3): control characters never reach the
/// rendered line in their raw form.
#[test]
fn sanitization_strips_and_escapes_control_characters() {
    let logger = inert_logger();
    let sink = RecordingSink::new();
    logger.add_sink(sink.clone());

    logger.info("line one\nline two\rwith\0nul and \x1b[31mcolor\x1b[0m").unwrap();

    let lines = sink.lines();
    assert_eq!(lines.len(), 1);
    let rendered = &lines[0];
    assert!(!rendered.contains('\n'));
    assert!(!rendered.contains('\r'));
    assert!(!rendered.contains('\0'));
    assert!(!rendered.contains('\x1b'));
    assert!(rendered.contains("line one\\nline two\\rwith"));
}

/// Basic mode is precision-first: email addresses are NOT redacted (they
/// belong to `full` per spec §4.2), but a password field still is.
#[test]
fn basic_mode_is_narrower_than_full_mode() {
    let logger = inert_logger();
    let sink = RecordingSink::new();
    logger.add_sink(sink.clone());

    logger.info("contact a.b@example.com, password=hunter2").unwrap();

    let lines = sink.lines();
    assert!(lines[0].contains("a.b@example.com"));
    assert!(lines[0].contains("password=[REDACTED]"));
}

/// Rotation size bound + backup ordering (properties 4, 5): after several
/// rotations, only the highest-indexed backups survive.
#[test]
fn rotation_keeps_only_the_highest_indexed_backups() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("svc.log");

    let sink = FileSink::new(path.clone(), 0.0005, 2, None, false).unwrap();
    for i in 0..6 {
        let line = format!("record number {i} {}", "x".repeat(280));
        sink.write(line.as_bytes()).unwrap();
    }
    sink.close().unwrap();

    let mut backups: Vec<u64> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let name = e.file_name().to_string_lossy().into_owned();
            let rest = name.strip_prefix("svc_log_")?.strip_suffix(".log")?;
            rest.parse::<u64>().ok()
        })
        .collect();
    backups.sort();

    assert_eq!(backups.len(), 2);
    assert!(backups[1] > backups[0]);
}

/// Atomic compression (property 6): a compressed backup decodes back to
/// its original bytes and no bare `.gz.tmp` is left behind.
#[test]
fn compressed_backups_decode_cleanly_and_leave_no_tmp_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.log");

    let sink = FileSink::new(path.clone(), 0.0005, 5, None, true).unwrap();
    for i in 0..4 {
        let line = format!("compressed payload line {i} {}", "y".repeat(280));
        sink.write(line.as_bytes()).unwrap();
    }
    sink.close().unwrap();

    let entries: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();

    assert!(entries.iter().any(|n| n.ends_with(".gz")));
    assert!(!entries.iter().any(|n| n.ends_with(".gz.tmp")));
}

/// Rate-limit fairness (property 7): the `Sample` strategy admits
/// additional records from the overflow at roughly one in every `n`.
#[test]
fn sample_strategy_admits_a_fraction_of_the_overflow() {
    let mut config = LoggerConfig::default();
    config.auto_sink = false;
    config.rate_limit = RateLimitConfig {
        max_messages: 10,
        max_bytes: 0,
        burst_size: 0,
        strategy: RateLimitStrategy::Sample(5),
        sampling_rate: 5,
    };
    let logger = Logger::with_config(config).unwrap();
    let sink = RecordingSink::new();
    logger.add_sink(sink.clone());

    for _ in 0..60 {
        logger.info("x").unwrap();
    }

    // 10 admitted outright, plus roughly (50 overflow / 5) sampled through.
    let admitted = sink.lines().len();
    assert!(admitted > 10, "sampling should admit some of the overflow, got {admitted}");
    assert!(admitted < 60, "sampling must not admit everything");
}

/// Time cache consistency (property 8): two records formatted within the
/// same wall-clock second carry identical timestamp strings.
#[test]
fn records_in_the_same_second_share_an_identical_timestamp_string() {
    let mut config = LoggerConfig::default();
    config.auto_sink = false;
    let logger = Logger::with_config(config.clone()).unwrap();
    let sink = RecordingSink::new();
    logger.add_sink(sink.clone());

    for _ in 0..5 {
        logger.info("tick").unwrap();
    }

    let lines = sink.lines();
    let stamps: Vec<&str> = lines
        .iter()
        .map(|l| l.split(' ').next().unwrap_or(""))
        .collect();
    assert!(stamps.iter().all(|s| *s == stamps[0]));
}

/// Idempotent close (property 10): closing twice performs no further I/O
/// and does not error.
#[test]
fn closing_a_file_sink_twice_is_safe() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("idempotent.log");
    let sink = FileSink::new(path, 1.0, 3, None, false).unwrap();
    sink.write(b"one line").unwrap();
    assert!(sink.close().is_ok());
    assert!(sink.close().is_ok());
}

/// The buffered sink wrapper coalesces small writes and only forwards to
/// the wrapped sink on flush/overflow/close.
#[test]
fn buffered_sink_coalesces_writes_until_flush() {
    struct CountingSink {
        writes: Arc<std::sync::atomic::AtomicUsize>,
    }
    impl Sink for CountingSink {
        fn write(&self, _data: &[u8]) -> Result<()> {
            self.writes.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        }
        fn flush(&self) -> Result<()> {
            Ok(())
        }
        fn close(&self) -> Result<()> {
            Ok(())
        }
    }

    let writes = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let buffered = BufferedSink::with_capacity(CountingSink { writes: Arc::clone(&writes) }, 256);

    buffered.write(b"short line one").unwrap();
    buffered.write(b"short line two").unwrap();
    assert_eq!(writes.load(std::sync::atomic::Ordering::SeqCst), 0);

    buffered.flush().unwrap();
    assert_eq!(writes.load(std::sync::atomic::Ordering::SeqCst), 1);
}

/// Loading a `logly.toml`-shaped config from a custom path applies the
/// security and rate-limit sections onto the default config.
#[test]
fn config_file_loader_applies_security_and_rate_limit_sections() {
    use logly::config_file::ConfigFileLoader;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("custom.toml");
    std::fs::write(
        &path,
        r#"
        [logly.configuration]
        level = "warn"

        [logly.security]
        mode = "full"
        max_record_bytes = 2048

        [logly.rate_limit]
        max_messages = 3
        burst_size = 1
        strategy = "drop"
        "#,
    )
    .unwrap();

    let mut loader = ConfigFileLoader::new();
    loader.set_custom_path(path);
    let config = loader.load().unwrap().expect("config file should load");

    assert_eq!(config.level, Severity::Warn);
    assert_eq!(config.security.mode, RedactionMode::Full);
    assert_eq!(config.security.max_record_bytes, 2048);
    assert_eq!(config.rate_limit.max_messages, 3);
}

/// Concurrency safety (property 9): every admitted record from every
/// producer thread appears exactly once, with no interleaving within a
/// single line.
#[test]
fn concurrent_producers_never_interleave_within_a_line() {
    use std::thread;

    let logger = Arc::new(inert_logger());
    let sink = RecordingSink::new();
    logger.add_sink(sink.clone());

    let mut handles = Vec::new();
    for t in 0..6 {
        let logger = Arc::clone(&logger);
        handles.push(thread::spawn(move || {
            for i in 0..40 {
                logger.info(format!("producer-{t}-record-{i}")).unwrap();
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    let lines = sink.lines();
    assert_eq!(lines.len(), 6 * 40);
    for line in &lines {
        assert!(line.matches("producer-").count() == 1);
    }
}
