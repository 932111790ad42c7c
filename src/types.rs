//! Domain types shared across the engine.
//!
//! Order ids and tickers are fixed-width opaque byte strings, matching the
//! inbound wire format: ids are 16 bytes, tickers 4 bytes, both zero-padded.

use serde::{Serialize, Serializer};
use std::fmt;

/// Length of an order id on the wire, in bytes.
pub const ORDER_ID_LEN: usize = 16;

/// Length of a ticker on the wire, in bytes.
pub const TICKER_LEN: usize = 4;

/// Highest admissible limit price, in fixed minor units.
///
/// Prices are integer ticks in `0..=MAX_PRICE`. A market buy crosses as if
/// priced at `MAX_PRICE`; a market sell as if priced at `0`.
pub const MAX_PRICE: u32 = 20_000;

/// Opaque 16-byte order identifier.
///
/// Ids are compared and hashed as raw bytes. Uniqueness is per book.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrderId([u8; ORDER_ID_LEN]);

impl OrderId {
    /// Build an id from a short tag, zero-padded to 16 bytes.
    pub fn new(tag: &[u8]) -> Self {
        let mut bytes = [0u8; ORDER_ID_LEN];
        let n = tag.len().min(ORDER_ID_LEN);
        bytes[..n].copy_from_slice(&tag[..n]);
        Self(bytes)
    }

    pub const fn from_bytes(bytes: [u8; ORDER_ID_LEN]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; ORDER_ID_LEN] {
        &self.0
    }
}

impl fmt::Debug for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OrderId({})", trimmed(&self.0))
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&trimmed(&self.0))
    }
}

impl Serialize for OrderId {
    /// Log records carry the id as the UTF-8 rendering of its 16 raw bytes.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&String::from_utf8_lossy(&self.0))
    }
}

/// Opaque 4-byte ticker symbol, zero-padded.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticker([u8; TICKER_LEN]);

impl Ticker {
    /// Build a ticker from a short tag, zero-padded to 4 bytes.
    pub fn new(tag: &[u8]) -> Self {
        let mut bytes = [0u8; TICKER_LEN];
        let n = tag.len().min(TICKER_LEN);
        bytes[..n].copy_from_slice(&tag[..n]);
        Self(bytes)
    }

    pub const fn from_bytes(bytes: [u8; TICKER_LEN]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; TICKER_LEN] {
        &self.0
    }

    /// First two bytes, uppercased. Drives the shard bucket mapping.
    pub fn lead_chars(&self) -> (u8, u8) {
        (
            self.0[0].to_ascii_uppercase(),
            self.0[1].to_ascii_uppercase(),
        )
    }
}

impl fmt::Debug for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ticker({})", trimmed(&self.0))
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&trimmed(&self.0))
    }
}

fn trimmed(bytes: &[u8]) -> String {
    let end = bytes
        .iter()
        .rposition(|&b| b != 0)
        .map_or(0, |pos| pos + 1);
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// Order side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Side {
    Buy = 0,
    Sell = 1,
}

impl Side {
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl Serialize for Side {
    /// Log records encode the side numerically: 0 = Buy, 1 = Sell.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

/// Order kind. Market orders cross at the most aggressive admissible price
/// and never rest: any residual is discarded with a synthesized cancel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum OrderKind {
    #[default]
    Limit = 0,
    Market = 1,
}

/// Lifecycle status carried by inbound messages. The worker routes on it:
/// `New` adds, `Cancelled` cancels, the fill statuses are external state
/// revisions applied as modifies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum OrderStatus {
    New = 0,
    PartiallyFilled = 1,
    Filled = 2,
    Cancelled = 3,
}

/// A parsed order message, ready for dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub ticker: Ticker,
    /// Producer-supplied nanosecond timestamp.
    pub timestamp: u64,
    /// Limit price in ticks. Ignored for market orders.
    pub price: u32,
    pub qty: u64,
    pub side: Side,
    pub kind: OrderKind,
    pub status: OrderStatus,
}
