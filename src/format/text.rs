//! Text-form rendering
//!
//! `time | [LEVEL] message | key=value key2="needs quoting"`, with each
//! segment gated by its own `include_*` flag. Caller attribution, when
//! enabled, is appended as `caller=file:line`.

use super::pool::BufferPool;
use super::time_cache::TimeCache;
use crate::config::LoggerConfig;
use crate::level::Severity;
use crate::record::Record;
use chrono::{DateTime, Utc};

/// Replaces the teacher's token vocabulary (`YYYY`, `MM`, `DD`, `HH`, ...)
/// in a custom time pattern. Kept as a free function so [`super::time_cache::TimeCache`]
/// can call it without depending on the rest of the text renderer.
pub fn apply_time_pattern(pattern: &str, timestamp: DateTime<Utc>) -> String {
    let mut result = pattern.to_string();

    result = result.replace("YYYY", &timestamp.format("%Y").to_string());
    result = result.replace("YY", &timestamp.format("%y").to_string());

    result = result.replace("MMMM", &timestamp.format("%B").to_string());
    result = result.replace("MMM", &timestamp.format("%b").to_string());
    result = result.replace("MM", &timestamp.format("%m").to_string());

    result = result.replace("dddd", &timestamp.format("%A").to_string());
    result = result.replace("ddd", &timestamp.format("%a").to_string());
    result = result.replace("DD", &timestamp.format("%d").to_string());

    result = result.replace("HH", &timestamp.format("%H").to_string());
    result = result.replace("hh", &timestamp.format("%I").to_string());

    result = result.replace("mm", &timestamp.format("%M").to_string());
    result = result.replace("ss", &timestamp.format("%S").to_string());

    result = result.replace("SSSSSS", &timestamp.format("%6f").to_string());
    result = result.replace("SSS", &timestamp.format("%3f").to_string());

    result = result.replace("A", &timestamp.format("%p").to_string());
    result = result.replace("a", &timestamp.format("%P").to_string());

    result = result.replace("ZZ", &timestamp.format("%:z").to_string());
    result = result.replace("Z", &timestamp.format("%z").to_string());

    result
}

fn colorize(text: &str, color_code: &str) -> String {
    format!("\x1b[{}m{}\x1b[0m", color_code, text)
}

/// Renders `record` into text form, starting from a scratch buffer borrowed
/// from `pool` (or a fresh allocation on a pool miss) and handing ownership
/// of that same buffer to the caller as the return value — no copy is made
/// to return it. The pool regains a buffer to reuse only when some other
/// caller explicitly returns one via [`BufferPool::give_back`]; `render`
/// itself never calls it, since the string it built is still live.
///
/// Layout: optional `[<timestamp> <LEVEL padded to 5 cols>]` prefix, optional
/// `file:line` caller, the message, then space-separated `key=value` fields.
pub fn render(record: &Record, config: &LoggerConfig, pool: &BufferPool, time_cache: &TimeCache) -> String {
    let mut out = pool.take();

    if config.include_time || config.include_level {
        out.push('[');
        let mut wrote_time = false;
        if config.include_time {
            out.push_str(&time_cache.render(record.timestamp));
            wrote_time = true;
        }
        if config.include_level {
            if wrote_time {
                out.push(' ');
            }
            let padded = format!("{:>5}", record.severity.as_str());
            if config.color {
                let color = config
                    .level_colors
                    .get(&record.severity)
                    .map(|s| s.as_str())
                    .unwrap_or(record.severity.default_color());
                out.push_str(&colorize(&padded, color));
            } else {
                out.push_str(&padded);
            }
        }
        out.push(']');
    }

    if config.include_caller {
        if let Some(ref caller) = record.caller {
            out.push(' ');
            out.push_str(&caller.file);
            out.push(':');
            out.push_str(&caller.line.to_string());
        }
    }

    if !out.is_empty() {
        out.push(' ');
    }
    out.push_str(&record.message);

    for field in &record.fields {
        out.push(' ');
        out.push_str(&field.name);
        out.push('=');
        if field.value.needs_quoting() {
            out.push('"');
            out.push_str(&field.value.canonical_text().replace('\\', "\\\\").replace('"', "\\\""));
            out.push('"');
        } else {
            out.push_str(&field.value.canonical_text());
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Field;

    #[test]
    fn quotes_field_values_containing_whitespace() {
        let config = LoggerConfig {
            color: false,
            ..LoggerConfig::default()
        };
        let pool = BufferPool::new();
        let cache = TimeCache::new("");
        let record = Record::new(Severity::Info, "hello")
            .with_field(Field::str("name", "has space"));
        let rendered = render(&record, &config, &pool, &cache);
        assert!(rendered.contains(r#"name="has space""#));
    }

    #[test]
    fn omits_disabled_segments() {
        let config = LoggerConfig {
            include_time: false,
            include_level: false,
            color: false,
            ..LoggerConfig::default()
        };
        let pool = BufferPool::new();
        let cache = TimeCache::new("");
        let record = Record::new(Severity::Info, "plain message");
        let rendered = render(&record, &config, &pool, &cache);
        assert_eq!(rendered, "plain message");
    }

    #[test]
    fn level_only_prefix_is_padded_to_five_columns() {
        let config = LoggerConfig {
            include_time: false,
            include_level: true,
            color: false,
            ..LoggerConfig::default()
        };
        let pool = BufferPool::new();
        let cache = TimeCache::new("");
        let record = Record::new(Severity::Info, "hello").with_field(Field::i64("n", 7));
        let rendered = render(&record, &config, &pool, &cache);
        assert_eq!(rendered, "[ INFO] hello n=7");
    }
}
