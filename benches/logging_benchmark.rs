// Performance benchmarks for logly

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use logly::error::Result;
use logly::prelude::*;
use serde_json;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

/// Discards every write; isolates formatting/redaction/dispatch cost from
/// actual I/O so the benchmarks measure the library, not the terminal or
/// filesystem underneath it.
struct NullSink;

impl Sink for NullSink {
    fn write(&self, _data: &[u8]) -> Result<()> {
        Ok(())
    }
    fn flush(&self) -> Result<()> {
        Ok(())
    }
    fn close(&self) -> Result<()> {
        Ok(())
    }
}

fn bench_logger(rate_limit: bool) -> Logger {
    let mut config = LoggerConfig::default();
    config.auto_sink = false;
    config.color = false;
    config.enable_version_check = false;
    if !rate_limit {
        config.rate_limit = logly::config::RateLimitConfig::default();
    }
    let logger = Logger::with_config(config).unwrap();
    logger.add_sink(Arc::new(NullSink));
    logger
}

fn export_bench_result(bench_path: &str) {
    let json_path = format!("target/criterion/{}/estimates.json", bench_path);
    if let Ok(content) = fs::read_to_string(&json_path) {
        if let Ok(json) = serde_json::from_str::<serde_json::Value>(&content) {
            let mean_point = json["mean"]["point_estimate"].as_f64().unwrap_or(0.0);
            let mean_std_err = json["mean"]["standard_error"].as_f64().unwrap_or(0.0);
            let median_point = json["median"]["point_estimate"].as_f64().unwrap_or(0.0);
            let median_std_err = json["median"]["standard_error"].as_f64().unwrap_or(0.0);
            let summary = format!(
                "Benchmark: {}\nMean: {:.2} ns ± {:.2} ns\nMedian: {:.2} ns ± {:.2} ns\n",
                bench_path, mean_point, mean_std_err, median_point, median_std_err
            );
            let txt_path = format!("target/criterion/{}/summary.txt", bench_path);
            fs::write(&txt_path, summary).ok();
        }
    }
}

fn bench_basic_logging(c: &mut Criterion) {
    let logger = bench_logger(false);

    c.bench_function("basic_info_log", |b| {
        b.iter(|| {
            logger.info(black_box("Benchmark message".to_string())).unwrap();
        });
    });
    export_bench_result("basic_info_log");
}

fn bench_all_levels(c: &mut Criterion) {
    let logger = bench_logger(false);
    let mut group = c.benchmark_group("log_levels");

    group.bench_function("debug", |b| {
        b.iter(|| logger.debug(black_box("Debug".to_string())).unwrap());
    });
    export_bench_result("log_levels/debug");

    group.bench_function("info", |b| {
        b.iter(|| logger.info(black_box("Info".to_string())).unwrap());
    });
    export_bench_result("log_levels/info");

    group.bench_function("warn", |b| {
        b.iter(|| logger.warn(black_box("Warning".to_string())).unwrap());
    });
    export_bench_result("log_levels/warn");

    group.bench_function("error", |b| {
        b.iter(|| logger.error(black_box("Error".to_string())).unwrap());
    });
    export_bench_result("log_levels/error");

    group.finish();
}

fn bench_redaction_modes(c: &mut Criterion) {
    let mut group = c.benchmark_group("redaction_modes");
    let payload = "user alice@example.com paid with card 4111 1111 1111 1111 password=hunter2";

    for mode in [RedactionMode::Disabled, RedactionMode::Basic, RedactionMode::Full] {
        let mut config = LoggerConfig::default();
        config.auto_sink = false;
        config.color = false;
        config.security.mode = mode;
        let logger = Logger::with_config(config).unwrap();
        logger.add_sink(Arc::new(NullSink));

        group.bench_with_input(BenchmarkId::from_parameter(format!("{mode:?}")), &mode, |b, _| {
            b.iter(|| logger.info(black_box(payload.to_string())).unwrap());
        });
    }
    group.finish();
}

fn bench_file_logging(c: &mut Criterion) {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("bench.log");

    let mut config = LoggerConfig::default();
    config.auto_sink = false;
    config.color = false;
    config.file = Some(logly::config::FileConfig {
        max_size_mb: 512.0,
        max_backups: 1,
        ..logly::config::FileConfig::new(log_path)
    });
    let logger = Logger::with_config(config).unwrap();

    c.bench_function("file_logging", |b| {
        b.iter(|| {
            logger.info(black_box("File benchmark message".to_string())).unwrap();
        });
    });
    export_bench_result("file_logging");
}

fn bench_with_bound_fields(c: &mut Criterion) {
    let logger = bench_logger(false);

    logger.bind(Field::str("user_id", "12345"));
    logger.bind(Field::str("session", "abc-def"));
    logger.bind(Field::str("request_id", "req-xyz"));

    c.bench_function("logging_with_bound_fields", |b| {
        b.iter(|| {
            logger.info(black_box("Message with context".to_string())).unwrap();
        });
    });
    export_bench_result("logging_with_bound_fields");
}

fn bench_object_form(c: &mut Criterion) {
    let mut config = LoggerConfig::default();
    config.auto_sink = false;
    config.format = OutputFormat::Object;
    let logger = Logger::with_config(config).unwrap();
    logger.add_sink(Arc::new(NullSink));

    c.bench_function("object_form_log", |b| {
        b.iter(|| {
            logger
                .log(
                    Severity::Info,
                    black_box("object form message"),
                    vec![Field::i64("count", 42), Field::str("shard", "us-east-1")],
                )
                .unwrap();
        });
    });
    export_bench_result("object_form_log");
}

fn bench_concurrent_logging(c: &mut Criterion) {
    use std::thread;

    let logger = Arc::new(bench_logger(false));

    c.bench_function("concurrent_10_threads", |b| {
        b.iter(|| {
            let mut handles = vec![];

            for i in 0..10 {
                let logger_clone = Arc::clone(&logger);
                let handle = thread::spawn(move || {
                    logger_clone.info(format!("Thread {} message", i)).unwrap();
                });
                handles.push(handle);
            }

            for handle in handles {
                handle.join().unwrap();
            }
        });
    });
    export_bench_result("concurrent_10_threads");
}

fn bench_multiple_sinks(c: &mut Criterion) {
    let mut group = c.benchmark_group("multiple_sinks");

    for sink_count in [1, 2, 5, 10].iter() {
        let mut config = LoggerConfig::default();
        config.auto_sink = false;
        config.color = false;
        let logger = Logger::with_config(config).unwrap();

        for _ in 0..*sink_count {
            logger.add_sink(Arc::new(NullSink));
        }

        group.bench_with_input(BenchmarkId::from_parameter(sink_count), sink_count, |b, _| {
            b.iter(|| {
                logger.info(black_box("Multi-sink message".to_string())).unwrap();
            });
        });
        export_bench_result(&format!("multiple_sinks/{}", sink_count));
    }

    group.finish();
}

fn bench_rate_limited_logging(c: &mut Criterion) {
    let mut config = LoggerConfig::default();
    config.auto_sink = false;
    config.color = false;
    config.rate_limit = logly::config::RateLimitConfig {
        max_messages: 10_000,
        max_bytes: 0,
        burst_size: 1_000,
        strategy: logly::config::RateLimitStrategy::Drop,
        sampling_rate: 10,
    };
    let logger = Logger::with_config(config).unwrap();
    logger.add_sink(Arc::new(NullSink));

    c.bench_function("rate_limited_admission_check", |b| {
        b.iter(|| {
            logger.info(black_box("rate limited message")).unwrap();
        });
    });
    export_bench_result("rate_limited_admission_check");
}

criterion_group!(
    benches,
    bench_basic_logging,
    bench_all_levels,
    bench_redaction_modes,
    bench_file_logging,
    bench_with_bound_fields,
    bench_object_form,
    bench_concurrent_logging,
    bench_multiple_sinks,
    bench_rate_limited_logging,
);

criterion_main!(benches);
