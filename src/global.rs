//! Process-wide replaceable default logger
//!
//! Lazily constructed on first use with [`Logger::default`], and
//! replaceable at any time via [`set_default`] — the previous instance is
//! closed (flushed and its sinks released) before being dropped, so a
//! caller that replaces the default logger mid-run doesn't leak an open
//! file handle.

use crate::logger::Logger;
use arc_swap::ArcSwap;
use std::sync::{Arc, OnceLock};

static DEFAULT_LOGGER: OnceLock<ArcSwap<Logger>> = OnceLock::new();

fn slot() -> &'static ArcSwap<Logger> {
    DEFAULT_LOGGER.get_or_init(|| ArcSwap::new(Arc::new(Logger::default())))
}

/// Returns the current process-wide default logger.
pub fn default() -> Arc<Logger> {
    slot().load_full()
}

/// Replaces the process-wide default logger, closing the one it replaces.
pub fn set_default(logger: Arc<Logger>) {
    let previous = slot().swap(logger);
    previous.close();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoggerConfig;

    #[test]
    fn default_returns_the_same_instance_across_calls() {
        let a = default();
        let b = default();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn set_default_replaces_the_instance() {
        let mut config = LoggerConfig::default();
        config.auto_sink = false;
        let replacement = Arc::new(Logger::with_config(config).unwrap());
        set_default(Arc::clone(&replacement));
        assert!(Arc::ptr_eq(&default(), &replacement));
    }
}
