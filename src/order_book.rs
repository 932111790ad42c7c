//! The single-symbol limit order book.
//!
//! Levels are kept sparsely in hash maps keyed by price, with the best bid
//! and best ask cached as scalars: O(1) best-price access, O(1) add, and a
//! key scan only when the best level empties. The id index maps each
//! resting order to its (side, price, arena handle), giving O(1) cancel
//! and modify.
//!
//! Operations emit [`Event`]s into a caller-supplied buffer and do no I/O.

use rustc_hash::FxHashMap;

use crate::arena::{Arena, ArenaIndex, NULL_INDEX};
use crate::error::BookError;
use crate::events::Event;
use crate::price_level::PriceLevel;
use crate::types::{Order, OrderId, OrderKind, Side, MAX_PRICE};

const INITIAL_ORDER_CAPACITY: u32 = 1024;
const INITIAL_LEVEL_CAPACITY: usize = 64;

/// Location of a resting order: everything cancel needs, O(1).
#[derive(Clone, Copy, Debug)]
pub struct OrderLocation {
    pub handle: ArenaIndex,
    pub side: Side,
    pub price: u32,
}

pub struct OrderBook {
    pub(crate) arena: Arena,
    pub(crate) bids: FxHashMap<u32, PriceLevel>,
    pub(crate) asks: FxHashMap<u32, PriceLevel>,
    pub(crate) best_bid: Option<u32>,
    pub(crate) best_ask: Option<u32>,
    pub(crate) index: FxHashMap<OrderId, OrderLocation>,
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderBook {
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_ORDER_CAPACITY)
    }

    pub fn with_capacity(orders: u32) -> Self {
        Self {
            arena: Arena::new(orders),
            bids: FxHashMap::with_capacity_and_hasher(INITIAL_LEVEL_CAPACITY, Default::default()),
            asks: FxHashMap::with_capacity_and_hasher(INITIAL_LEVEL_CAPACITY, Default::default()),
            best_bid: None,
            best_ask: None,
            index: FxHashMap::with_capacity_and_hasher(orders as usize, Default::default()),
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Highest price with a resting bid, absent when the side is empty.
    #[inline]
    pub fn best_bid(&self) -> Option<u32> {
        self.best_bid
    }

    /// Lowest price with a resting ask, absent when the side is empty.
    #[inline]
    pub fn best_ask(&self) -> Option<u32> {
        self.best_ask
    }

    #[inline]
    pub fn contains(&self, id: &OrderId) -> bool {
        self.index.contains_key(id)
    }

    #[inline]
    pub fn order_count(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Aggregate quantity and order count resting at (side, price).
    pub fn depth_at(&self, side: Side, price: u32) -> (u64, u32) {
        self.levels(side)
            .get(&price)
            .map(|level| (level.total_qty, level.count))
            .unwrap_or((0, 0))
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Rest a new order.
    ///
    /// Market orders are re-priced to their crossing sentinel (`MAX_PRICE`
    /// for buys, `0` for sells) so the next `execute` consumes the opposite
    /// side; their carried limit price is ignored. Emits one
    /// `PriceLevelUpdate` on success.
    pub fn add(&mut self, order: &Order, events: &mut Vec<Event>) -> Result<(), BookError> {
        if self.index.contains_key(&order.id) {
            return Err(BookError::DuplicateId);
        }
        let price = match order.kind {
            OrderKind::Limit => {
                if order.price > MAX_PRICE {
                    return Err(BookError::InvalidPrice);
                }
                order.price
            }
            OrderKind::Market => match order.side {
                Side::Buy => MAX_PRICE,
                Side::Sell => 0,
            },
        };

        let handle = self.arena.alloc();
        {
            let node = self.arena.get_mut(handle);
            node.id = order.id;
            node.timestamp = order.timestamp;
            node.price = price;
            node.qty = order.qty;
            node.kind = order.kind;
        }
        self.link_at_tail(order.side, price, handle);
        self.index.insert(
            order.id,
            OrderLocation {
                handle,
                side: order.side,
                price,
            },
        );

        events.push(Event::price_level_update(
            order.timestamp,
            order.id,
            price,
            order.qty,
            order.side,
        ));
        Ok(())
    }

    /// Revise a resting order in place.
    ///
    /// The order is unlinked from its current level and re-linked at the
    /// tail of the target level, so time priority is lost even when side
    /// and price are unchanged. The id is preserved. Emits one `Modify`
    /// pairing the new snapshot with the old.
    pub fn modify(
        &mut self,
        id: &OrderId,
        revision: &Order,
        events: &mut Vec<Event>,
    ) -> Result<(), BookError> {
        if revision.price > MAX_PRICE {
            return Err(BookError::InvalidPrice);
        }
        let loc = *self.index.get(id).ok_or(BookError::OrderNotFound)?;
        let old = *self.arena.get(loc.handle);

        self.unlink(loc.side, loc.price, loc.handle);
        {
            let node = self.arena.get_mut(loc.handle);
            node.timestamp = revision.timestamp;
            node.price = revision.price;
            node.qty = revision.qty;
            node.kind = revision.kind;
        }
        self.link_at_tail(revision.side, revision.price, loc.handle);
        self.index.insert(
            *id,
            OrderLocation {
                handle: loc.handle,
                side: revision.side,
                price: revision.price,
            },
        );

        events.push(Event::modify(
            revision.timestamp,
            *id,
            revision.price,
            revision.qty,
            revision.side,
            loc.price,
            old.qty,
            loc.side,
        ));
        Ok(())
    }

    /// Remove a resting order. Emits one `Cancel` carrying the resting
    /// order's fields.
    pub fn cancel(&mut self, id: &OrderId, events: &mut Vec<Event>) -> Result<(), BookError> {
        let loc = self.index.remove(id).ok_or(BookError::OrderNotFound)?;
        let node = *self.arena.get(loc.handle);
        self.unlink(loc.side, loc.price, loc.handle);
        self.arena.free(loc.handle);

        events.push(Event::cancel(
            node.timestamp,
            node.id,
            loc.price,
            node.qty,
            loc.side,
        ));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Level plumbing
    // ------------------------------------------------------------------

    #[inline]
    pub(crate) fn levels(&self, side: Side) -> &FxHashMap<u32, PriceLevel> {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    /// Append a node at the tail of (side, price), creating the level on
    /// first use and refreshing the best-price cache.
    pub(crate) fn link_at_tail(&mut self, side: Side, price: u32, handle: ArenaIndex) {
        let level = match side {
            Side::Buy => self.bids.entry(price).or_default(),
            Side::Sell => self.asks.entry(price).or_default(),
        };
        level.push_back(&mut self.arena, handle);
        match side {
            Side::Buy => {
                if self.best_bid.map_or(true, |best| price > best) {
                    self.best_bid = Some(price);
                }
            }
            Side::Sell => {
                if self.best_ask.map_or(true, |best| price < best) {
                    self.best_ask = Some(price);
                }
            }
        }
    }

    /// Unlink a node from its level, erasing the level and re-deriving the
    /// best price when it empties. Does not free the node or touch the id
    /// index.
    pub(crate) fn unlink(&mut self, side: Side, price: u32, handle: ArenaIndex) {
        let levels = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        let mut emptied = false;
        if let Some(level) = levels.get_mut(&price) {
            emptied = level.remove(&mut self.arena, handle);
        }
        if emptied {
            self.remove_empty_level(side, price);
        }
    }

    pub(crate) fn remove_empty_level(&mut self, side: Side, price: u32) {
        match side {
            Side::Buy => {
                self.bids.remove(&price);
                if self.best_bid == Some(price) {
                    self.best_bid = self.bids.keys().copied().max();
                }
            }
            Side::Sell => {
                self.asks.remove(&price);
                if self.best_ask == Some(price) {
                    self.best_ask = self.asks.keys().copied().min();
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Consistency checking (test support)
    // ------------------------------------------------------------------

    /// Assert the structural invariants: cached bests match the level maps,
    /// listed levels are non-empty with exact aggregates, and the id index
    /// corresponds one-to-one with the resting orders.
    pub fn assert_invariants(&self) {
        assert_eq!(
            self.best_bid,
            self.bids.keys().copied().max(),
            "best_bid cache out of sync"
        );
        assert_eq!(
            self.best_ask,
            self.asks.keys().copied().min(),
            "best_ask cache out of sync"
        );

        let mut seen = 0usize;
        for (side, levels) in [(Side::Buy, &self.bids), (Side::Sell, &self.asks)] {
            for (&price, level) in levels {
                assert!(!level.is_empty(), "empty level listed at {price}");
                let mut sum = 0u64;
                let mut cur = level.head;
                let mut count = 0u32;
                while cur != NULL_INDEX {
                    let node = self.arena.get(cur);
                    sum += node.qty;
                    count += 1;
                    seen += 1;
                    let loc = self
                        .index
                        .get(&node.id)
                        .unwrap_or_else(|| panic!("resting order {} missing from index", node.id));
                    assert_eq!(loc.handle, cur, "index handle mismatch for {}", node.id);
                    assert_eq!(loc.side, side, "index side mismatch for {}", node.id);
                    assert_eq!(loc.price, price, "index price mismatch for {}", node.id);
                    cur = node.next;
                }
                assert_eq!(sum, level.total_qty, "aggregate qty mismatch at {price}");
                assert_eq!(count, level.count, "order count mismatch at {price}");
            }
        }
        assert_eq!(seen, self.index.len(), "index holds non-resting ids");
    }
}

impl std::fmt::Debug for OrderBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderBook")
            .field("best_bid", &self.best_bid)
            .field("best_ask", &self.best_ask)
            .field("bid_levels", &self.bids.len())
            .field("ask_levels", &self.asks.len())
            .field("orders", &self.index.len())
            .finish()
    }
}
