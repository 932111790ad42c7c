//! Book mutation events.
//!
//! Every book operation describes its effect as an [`Event`] pushed into a
//! caller-supplied buffer; the owning worker forwards the buffer to the log
//! queue. The book itself never touches I/O.
//!
//! An event serializes to one JSON log line. Trade reports and modifies
//! carry a secondary order quadruple: the sell side of a fill, or the
//! pre-modify snapshot.

use crate::types::{OrderId, Side};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A new order rested on a price level.
    PriceLevelUpdate,
    /// A fill. Primary quadruple is the buy side, secondary the sell side,
    /// each at its own resting price.
    TradeReport,
    /// An in-place revision. Primary quadruple is the new state, secondary
    /// the old.
    Modify,
    /// A resting order left the book without filling.
    Cancel,
}

/// Secondary order quadruple for `TradeReport` and `Modify` records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Counterparty {
    #[serde(rename = "order_id_secondary")]
    pub order_id: OrderId,
    #[serde(rename = "price_secondary")]
    pub price: u32,
    #[serde(rename = "qty_secondary")]
    pub qty: u64,
    #[serde(rename = "side_secondary")]
    pub side: Side,
}

/// One append-only log record. Field order here is the on-disk field order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Nanoseconds. Producer-supplied for book mutations, a monotonic
    /// reading shared by the whole burst for trade reports.
    pub timestamp: u64,
    pub order_id: OrderId,
    pub price: u32,
    pub qty: u64,
    pub side: Side,
    #[serde(flatten)]
    pub secondary: Option<Counterparty>,
}

impl Event {
    pub fn price_level_update(
        timestamp: u64,
        order_id: OrderId,
        price: u32,
        qty: u64,
        side: Side,
    ) -> Self {
        Self {
            kind: EventKind::PriceLevelUpdate,
            timestamp,
            order_id,
            price,
            qty,
            side,
            secondary: None,
        }
    }

    pub fn trade_report(
        timestamp: u64,
        buy_id: OrderId,
        buy_price: u32,
        sell_id: OrderId,
        sell_price: u32,
        qty: u64,
    ) -> Self {
        Self {
            kind: EventKind::TradeReport,
            timestamp,
            order_id: buy_id,
            price: buy_price,
            qty,
            side: Side::Buy,
            secondary: Some(Counterparty {
                order_id: sell_id,
                price: sell_price,
                qty,
                side: Side::Sell,
            }),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn modify(
        timestamp: u64,
        order_id: OrderId,
        new_price: u32,
        new_qty: u64,
        new_side: Side,
        old_price: u32,
        old_qty: u64,
        old_side: Side,
    ) -> Self {
        Self {
            kind: EventKind::Modify,
            timestamp,
            order_id,
            price: new_price,
            qty: new_qty,
            side: new_side,
            secondary: Some(Counterparty {
                order_id,
                price: old_price,
                qty: old_qty,
                side: old_side,
            }),
        }
    }

    pub fn cancel(timestamp: u64, order_id: OrderId, price: u32, qty: u64, side: Side) -> Self {
        Self {
            kind: EventKind::Cancel,
            timestamp,
            order_id,
            price,
            qty,
            side,
            secondary: None,
        }
    }
}
