//! Record formatting: text form, object (JSON) form, pooled scratch buffers,
//! and a per-second time cache.

pub mod object;
pub mod pool;
pub mod text;

use crate::config::{LoggerConfig, OutputFormat};
use crate::record::Record;
use pool::BufferPool;
use time_cache::TimeCache;

pub mod time_cache;

/// Renders records to their configured output form. Owns the scratch buffer
/// pool and the time cache so repeated calls reuse both.
pub struct Formatter {
    pool: BufferPool,
    time_cache: TimeCache,
}

impl Formatter {
    pub fn new(time_format: impl Into<String>) -> Self {
        Self {
            pool: BufferPool::new(),
            time_cache: TimeCache::new(time_format),
        }
    }

    pub fn format(&self, record: &Record, config: &LoggerConfig) -> String {
        match config.format {
            OutputFormat::Text => text::render(record, config, &self.pool, &self.time_cache),
            OutputFormat::Object => object::render(record, config, &self.time_cache),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Severity;

    #[test]
    fn dispatches_on_configured_output_format() {
        let formatter = Formatter::new("");
        let record = Record::new(Severity::Info, "hi");

        let mut text_config = LoggerConfig::default();
        text_config.color = false;
        assert!(formatter.format(&record, &text_config).contains("hi"));

        let mut json_config = LoggerConfig::default();
        json_config.format = OutputFormat::Object;
        let rendered = formatter.format(&record, &json_config);
        assert!(rendered.starts_with('{'));
    }
}
