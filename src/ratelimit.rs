//! Token-bucket rate limiting
//!
//! Two independent dimensions — messages/sec and bytes/sec — each with its
//! own burst allowance. The hot path is lock-free: every check is a handful
//! of atomic loads/stores. Only the rare per-second rollover takes a
//! `parking_lot::Mutex`, and only long enough to reset the two counters and
//! advance the second marker.

use crate::config::{RateLimitConfig, RateLimitStrategy};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// Outcome of a single admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allow,
    Deny,
}

struct Bucket {
    current_second: AtomicU64,
    messages_this_second: AtomicU32,
    bytes_this_second: AtomicU64,
    rollover: Mutex<()>,
}

/// Token-bucket limiter admitting records by count and by byte size.
pub struct RateLimiter {
    config: RateLimitConfig,
    bucket: Bucket,
    dropped: AtomicU64,
    sample_counter: AtomicU64,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            bucket: Bucket {
                current_second: AtomicU64::new(0),
                messages_this_second: AtomicU32::new(0),
                bytes_this_second: AtomicU64::new(0),
                rollover: Mutex::new(()),
            },
            dropped: AtomicU64::new(0),
            sample_counter: AtomicU64::new(0),
        }
    }

    /// Checks and (if admitted) accounts for a record of `byte_len` bytes.
    /// A disabled limiter (both bounds zero/negative) always allows.
    pub fn check(&self, byte_len: u64, now_unix_secs: u64) -> Admission {
        if self.config.is_disabled() {
            return Admission::Allow;
        }

        self.maybe_roll_over(now_unix_secs);

        let burst = self.config.burst_size as u64;

        let msg_ok = self.config.max_messages == 0 || {
            let prev = self.bucket.messages_this_second.fetch_add(1, Ordering::Relaxed);
            (prev as u64) < self.config.max_messages as u64 + burst
        };

        let bytes_ok = self.config.max_bytes == 0 || {
            let prev = self.bucket.bytes_this_second.fetch_add(byte_len, Ordering::Relaxed);
            prev < self.config.max_bytes + burst
        };

        if msg_ok && bytes_ok {
            return Admission::Allow;
        }

        self.dropped.fetch_add(1, Ordering::Relaxed);

        match self.config.strategy {
            RateLimitStrategy::Sample(n) if n > 0 => {
                let c = self.sample_counter.fetch_add(1, Ordering::Relaxed);
                if c % n as u64 == 0 {
                    Admission::Allow
                } else {
                    Admission::Deny
                }
            }
            // `Throttle` is documented as semantically slow-to-steady-state
            // but is implemented as a hard drop: blocking inside a log call
            // is not acceptable on the hot path.
            RateLimitStrategy::Throttle | RateLimitStrategy::Drop | RateLimitStrategy::Sample(_) => {
                Admission::Deny
            }
        }
    }

    /// Total records denied admission since construction.
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn maybe_roll_over(&self, now_unix_secs: u64) {
        let current = self.bucket.current_second.load(Ordering::Relaxed);
        if current == now_unix_secs {
            return;
        }

        let _guard = self.bucket.rollover.lock();
        // Re-check under the lock: another thread may have already rolled
        // this second over while we were waiting.
        if self.bucket.current_second.load(Ordering::Relaxed) == now_unix_secs {
            return;
        }
        self.bucket.current_second.store(now_unix_secs, Ordering::Relaxed);
        self.bucket.messages_this_second.store(0, Ordering::Relaxed);
        self.bucket.bytes_this_second.store(0, Ordering::Relaxed);
    }
}
