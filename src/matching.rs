//! Crossing: the matching pass over a book.
//!
//! `execute` runs until no crossed pair remains, filling the time-priority
//! fronts of the best bid and best ask level against each other. Each fill
//! is reported with both resting prices; the whole burst shares one
//! monotonic timestamp, read once per call so the clock stays out of the
//! inner loop.

use std::sync::OnceLock;
use std::time::Instant;

use crate::arena::NULL_INDEX;
use crate::events::Event;
use crate::order_book::OrderBook;
use crate::types::{OrderKind, Side, MAX_PRICE};

/// Monotonic nanosecond reading, anchored at first use.
fn monotonic_ns() -> u64 {
    static ANCHOR: OnceLock<Instant> = OnceLock::new();
    ANCHOR.get_or_init(Instant::now).elapsed().as_nanos() as u64
}

impl OrderBook {
    /// Cross the book until `best_bid < best_ask` or a side is exhausted.
    ///
    /// Emits one `TradeReport` per fill. Residual market orders — which can
    /// only be queued at the crossing sentinels — never rest: they are
    /// discarded afterwards with a synthesized `Cancel` each.
    pub fn execute(&mut self, events: &mut Vec<Event>) {
        let match_ts = monotonic_ns();

        loop {
            let (Some(bid_px), Some(ask_px)) = (self.best_bid, self.best_ask) else {
                break;
            };
            if bid_px < ask_px {
                break;
            }
            let bid_front = self.bids.get(&bid_px).and_then(|level| level.front());
            let ask_front = self.asks.get(&ask_px).and_then(|level| level.front());
            let (Some(buy), Some(sell)) = (bid_front, ask_front) else {
                break;
            };

            let buy_node = *self.arena.get(buy);
            let sell_node = *self.arena.get(sell);
            let matched = buy_node.qty.min(sell_node.qty);

            self.arena.get_mut(buy).qty -= matched;
            self.arena.get_mut(sell).qty -= matched;
            if let Some(level) = self.bids.get_mut(&bid_px) {
                level.subtract_qty(matched);
            }
            if let Some(level) = self.asks.get_mut(&ask_px) {
                level.subtract_qty(matched);
            }

            events.push(Event::trade_report(
                match_ts,
                buy_node.id,
                bid_px,
                sell_node.id,
                ask_px,
                matched,
            ));

            if buy_node.qty == matched {
                self.index.remove(&buy_node.id);
                self.unlink(Side::Buy, bid_px, buy);
                self.arena.free(buy);
            }
            if sell_node.qty == matched {
                self.index.remove(&sell_node.id);
                self.unlink(Side::Sell, ask_px, sell);
                self.arena.free(sell);
            }
        }

        self.discard_market_residuals(match_ts, events);
    }

    /// Drop any market orders still queued after crossing stopped. They sit
    /// at `bids[MAX_PRICE]` / `asks[0]` by construction, so only those two
    /// levels need scanning.
    fn discard_market_residuals(&mut self, ts: u64, events: &mut Vec<Event>) {
        self.discard_market_at(Side::Buy, MAX_PRICE, ts, events);
        self.discard_market_at(Side::Sell, 0, ts, events);
    }

    fn discard_market_at(&mut self, side: Side, price: u32, ts: u64, events: &mut Vec<Event>) {
        let mut residuals = Vec::new();
        if let Some(level) = self.levels(side).get(&price) {
            let mut cur = level.head;
            while cur != NULL_INDEX {
                let node = self.arena.get(cur);
                if node.kind == OrderKind::Market {
                    residuals.push(cur);
                }
                cur = node.next;
            }
        }
        for handle in residuals {
            let node = *self.arena.get(handle);
            self.index.remove(&node.id);
            self.unlink(side, price, handle);
            self.arena.free(handle);
            events.push(Event::cancel(ts, node.id, price, node.qty, side));
        }
    }
}
