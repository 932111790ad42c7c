//! Shard worker: the single thread that owns a partition of the symbol
//! universe.
//!
//! The loop drains the shard queue in small batches, routes each order by
//! its status field, runs the matching pass after every successful
//! mutation, and forwards the resulting events to the log queue in order.
//! Books are worker-local, so no locking is ever required around book
//! state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::queue::SegQueue;
use rustc_hash::FxHashMap;

use crate::events::{Event, EventKind};
use crate::logger::EventSink;
use crate::metrics::Metrics;
use crate::order_book::OrderBook;
use crate::types::{Order, OrderStatus, Ticker};

/// Orders taken per drain pass. Batching amortizes per-pass overhead and
/// never reorders within the shard.
pub(crate) const DRAIN_BATCH: usize = 128;

pub(crate) struct WorkerConfig {
    pub shard: usize,
    pub queue: Arc<SegQueue<Order>>,
    pub sink: EventSink,
    pub running: Arc<AtomicBool>,
    pub metrics: Arc<Metrics>,
    /// Symbols to pre-register; everything else is created on first
    /// message.
    pub symbols: Vec<Ticker>,
    pub pin_to_core: bool,
}

pub(crate) fn spawn(config: WorkerConfig) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(format!("book-worker-{}", config.shard))
        .spawn(move || run(config))
}

fn run(config: WorkerConfig) {
    let WorkerConfig {
        shard,
        queue,
        sink,
        running,
        metrics,
        symbols,
        pin_to_core,
    } = config;

    if pin_to_core {
        pin_current_thread(shard);
    }

    let mut books: FxHashMap<Ticker, OrderBook> = FxHashMap::default();
    for symbol in symbols {
        books.entry(symbol).or_insert_with(OrderBook::new);
    }

    let mut events: Vec<Event> = Vec::with_capacity(4 * DRAIN_BATCH);
    tracing::debug!(shard, books = books.len(), "worker started");

    while running.load(Ordering::Acquire) {
        if drain_pass(&queue, &mut books, &mut events, &sink, &metrics) == 0 {
            thread::yield_now();
        }
    }

    // Best-effort drain of whatever was enqueued before stop flipped.
    while drain_pass(&queue, &mut books, &mut events, &sink, &metrics) > 0 {}

    tracing::debug!(shard, "worker stopped");
}

fn drain_pass(
    queue: &SegQueue<Order>,
    books: &mut FxHashMap<Ticker, OrderBook>,
    events: &mut Vec<Event>,
    sink: &EventSink,
    metrics: &Metrics,
) -> usize {
    let mut drained = 0;
    while drained < DRAIN_BATCH {
        let Some(order) = queue.pop() else {
            break;
        };
        apply(&order, books, events, sink, metrics);
        drained += 1;
    }
    drained
}

fn apply(
    order: &Order,
    books: &mut FxHashMap<Ticker, OrderBook>,
    events: &mut Vec<Event>,
    sink: &EventSink,
    metrics: &Metrics,
) {
    let book = books
        .entry(order.ticker)
        .or_insert_with(OrderBook::new);

    let result = match order.status {
        OrderStatus::New => book.add(order, events),
        OrderStatus::Cancelled => book.cancel(&order.id, events),
        OrderStatus::PartiallyFilled | OrderStatus::Filled => {
            book.modify(&order.id, order, events)
        }
    };

    match result {
        Ok(()) => {
            // Fills must reach the log before the next mutation on this
            // book is visible.
            book.execute(events);
            metrics.inc_ops_applied();
        }
        Err(err) => {
            metrics.inc_ops_rejected();
            tracing::debug!(%err, order_id = %order.id, ticker = %order.ticker, "order rejected");
        }
    }

    for event in events.drain(..) {
        if event.kind == EventKind::TradeReport {
            metrics.inc_trades();
        }
        sink.push(event);
    }
}

fn pin_current_thread(shard: usize) {
    match core_affinity::get_core_ids() {
        Some(cores) if !cores.is_empty() => {
            let core = cores[shard % cores.len()];
            if core_affinity::set_for_current(core) {
                tracing::debug!(shard, core = core.id, "worker pinned");
            }
        }
        _ => tracing::debug!(shard, "no cores available for pinning"),
    }
}
