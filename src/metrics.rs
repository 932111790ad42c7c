//! Engine counters.
//!
//! Cheap relaxed atomics bumped on the hot paths; read at any time from
//! any thread. Rejections and drops are counted here rather than surfaced
//! as failures — a malformed order is never fatal.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    msgs_total: AtomicU64,
    parse_errors: AtomicU64,
    unknown_bucket: AtomicU64,
    ops_applied: AtomicU64,
    ops_rejected: AtomicU64,
    trades: AtomicU64,
    events_logged: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn inc_msgs_total(&self) {
        self.msgs_total.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_parse_errors(&self) {
        self.parse_errors.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_unknown_bucket(&self) {
        self.unknown_bucket.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_ops_applied(&self) {
        self.ops_applied.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_ops_rejected(&self) {
        self.ops_rejected.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_trades(&self) {
        self.trades.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_events_logged(&self) {
        self.events_logged.fetch_add(1, Ordering::Relaxed);
    }

    pub fn msgs_total(&self) -> u64 {
        self.msgs_total.load(Ordering::Relaxed)
    }

    pub fn parse_errors(&self) -> u64 {
        self.parse_errors.load(Ordering::Relaxed)
    }

    pub fn unknown_bucket(&self) -> u64 {
        self.unknown_bucket.load(Ordering::Relaxed)
    }

    pub fn ops_applied(&self) -> u64 {
        self.ops_applied.load(Ordering::Relaxed)
    }

    pub fn ops_rejected(&self) -> u64 {
        self.ops_rejected.load(Ordering::Relaxed)
    }

    pub fn trades(&self) -> u64 {
        self.trades.load(Ordering::Relaxed)
    }

    pub fn events_logged(&self) -> u64 {
        self.events_logged.load(Ordering::Relaxed)
    }
}
