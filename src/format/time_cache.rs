//! Lock-free per-second timestamp cache
//!
//! Formatting a timestamp (especially with a custom pattern) costs more
//! than the rest of the non-JSON text path combined, and most records in a
//! busy server land in the same wall-clock second. `TimeCache` renders once
//! per second per distinct format string and serves every other call that
//! second from an `arc_swap::ArcSwap` read, no lock taken.
//!
//! Writes race: two threads observing a new second simultaneously both
//! render and both store, but since they render the *same* second with the
//! *same* format, they produce byte-identical strings, so the race is
//! benign (see DESIGN.md, Open Question #2).

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub struct TimeCache {
    slot: ArcSwap<(i64, Arc<str>)>,
    format: String,
}

impl TimeCache {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            slot: ArcSwap::new(Arc::new((i64::MIN, Arc::from("")))),
            format: format.into(),
        }
    }

    /// Returns the rendered form of `now`'s unix second, rendering and
    /// caching it first if this is the first call for that second.
    pub fn render(&self, now: DateTime<Utc>) -> Arc<str> {
        let second = now.timestamp();
        let cached = self.slot.load();
        if cached.0 == second {
            return Arc::clone(&cached.1);
        }

        let rendered: Arc<str> = if self.format.is_empty() {
            Arc::from(now.to_rfc3339())
        } else {
            Arc::from(crate::format::text::apply_time_pattern(&self.format, now))
        };
        self.slot.store(Arc::new((second, Arc::clone(&rendered))));
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn caches_within_the_same_second_and_updates_across_seconds() {
        let cache = TimeCache::new("");
        let t1 = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let t1b = Utc.timestamp_opt(1_700_000_000, 500_000_000).unwrap();
        let t2 = Utc.timestamp_opt(1_700_000_001, 0).unwrap();

        let r1 = cache.render(t1);
        let r1b = cache.render(t1b);
        assert_eq!(r1, r1b);

        let r2 = cache.render(t2);
        assert_ne!(r1, r2);
    }
}
