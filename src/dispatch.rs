//! Ticker-to-shard routing.
//!
//! The bucket mapping is a pure function of the ticker's first two
//! characters: 26 initials, with the congested ones (E, I, P, S) split by
//! second character so US equity symbols spread roughly evenly. Buckets
//! fold onto shard queues modulo the worker count, so every order for a
//! given ticker lands on the same worker and per-symbol FIFO holds.

use std::sync::Arc;

use crossbeam::queue::SegQueue;

use crate::metrics::Metrics;
use crate::types::{Order, Ticker};

/// Bucket labels in index order. Useful for diagnostics; the dispatch path
/// works on indices alone.
pub const BUCKET_LABELS: [&str; 31] = [
    "A", "B", "C", "D", "EA-E", "EF-Z", "F", "G", "H", "IA-E", "IF-Z", "J", "K", "L", "M", "N",
    "O", "PA-E", "PF-Z", "Q", "R", "SA-E", "SF-N", "SO-Z", "T", "U", "V", "W", "X", "Y", "Z",
];

/// Map a ticker to its bucket index, or `None` when the leading character
/// is outside `A..=Z`.
pub fn bucket_of(ticker: &Ticker) -> Option<usize> {
    let (c0, c1) = ticker.lead_chars();
    let idx = match c0 {
        b'A'..=b'D' => (c0 - b'A') as usize,
        b'E' => {
            if (b'A'..=b'E').contains(&c1) {
                4
            } else {
                5
            }
        }
        b'F'..=b'H' => (c0 - b'A') as usize + 1,
        b'I' => {
            if (b'A'..=b'E').contains(&c1) {
                9
            } else {
                10
            }
        }
        b'J'..=b'O' => (c0 - b'A') as usize + 2,
        b'P' => {
            if (b'A'..=b'E').contains(&c1) {
                17
            } else {
                18
            }
        }
        b'Q' | b'R' => (c0 - b'A') as usize + 3,
        b'S' => {
            if (b'A'..=b'E').contains(&c1) {
                21
            } else if (b'F'..=b'N').contains(&c1) {
                22
            } else {
                23
            }
        }
        b'T'..=b'Z' => (c0 - b'A') as usize + 5,
        _ => return None,
    };
    Some(idx)
}

/// Routes parsed orders onto shard queues. Holds shared producer handles
/// only; queue consumption belongs to the owning workers.
pub struct Dispatcher {
    queues: Vec<Arc<SegQueue<Order>>>,
    metrics: Arc<Metrics>,
}

impl Dispatcher {
    pub(crate) fn new(queues: Vec<Arc<SegQueue<Order>>>, metrics: Arc<Metrics>) -> Self {
        debug_assert!(!queues.is_empty());
        Self { queues, metrics }
    }

    /// Shard index a ticker resolves to, if any.
    pub fn shard_of(&self, ticker: &Ticker) -> Option<usize> {
        bucket_of(ticker).map(|bucket| bucket % self.queues.len())
    }

    /// Enqueue an order onto its shard. Orders for unmappable tickers are
    /// dropped and counted.
    pub fn dispatch(&self, order: Order) -> bool {
        match self.shard_of(&order.ticker) {
            Some(shard) => {
                self.queues[shard].push(order);
                true
            }
            None => {
                self.metrics.inc_unknown_bucket();
                tracing::debug!(ticker = %order.ticker, "dropping order for unmappable ticker");
                false
            }
        }
    }
}
