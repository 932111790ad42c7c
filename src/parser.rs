//! Inbound wire-format decoding.
//!
//! One message per frame, big-endian, fixed layout:
//!
//! | offset | size | field                                   |
//! |--------|------|-----------------------------------------|
//! | 0      | 8    | timestamp (ns)                          |
//! | 8      | 1    | message type                            |
//! | 9      | 16   | order id (zero-padded)                  |
//! | 25     | 4    | ticker (zero-padded)                    |
//! | 29     | 4    | price — omitted for cancel              |
//! | 33     | 4    | quantity — omitted for cancel           |
//! | 37     | 1    | side byte `B`/`S` — update frames only  |

use crate::error::ParseError;
use crate::types::{Order, OrderId, OrderKind, OrderStatus, Side, Ticker, ORDER_ID_LEN, TICKER_LEN};

pub const MSG_LIMIT_BUY: u8 = 0x01;
pub const MSG_LIMIT_SELL: u8 = 0x02;
pub const MSG_MARKET_BUY: u8 = 0x03;
pub const MSG_MARKET_SELL: u8 = 0x04;
pub const MSG_UPDATE: u8 = 0x05;
pub const MSG_CANCEL: u8 = 0x06;

/// Bytes common to every frame: timestamp + type + id + ticker.
const BASE_LEN: usize = 8 + 1 + ORDER_ID_LEN + TICKER_LEN;

#[inline]
fn be_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    u64::from_be_bytes(buf)
}

#[inline]
fn be_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(bytes);
    u32::from_be_bytes(buf)
}

/// Decode one frame into an [`Order`].
///
/// Priced frames with a zero price or quantity are rejected; update frames
/// map to `PartiallyFilled`, cancel frames to `Cancelled`, the four priced
/// types to `New`.
pub fn parse_message(data: &[u8]) -> Result<Order, ParseError> {
    if data.len() < BASE_LEN {
        return Err(ParseError::Truncated);
    }

    let timestamp = be_u64(&data[0..8]);
    let msg_type = data[8];

    let mut id = [0u8; ORDER_ID_LEN];
    id.copy_from_slice(&data[9..9 + ORDER_ID_LEN]);
    let mut ticker = [0u8; TICKER_LEN];
    ticker.copy_from_slice(&data[25..25 + TICKER_LEN]);

    let (price, qty, side, kind, status) = match msg_type {
        MSG_LIMIT_BUY | MSG_LIMIT_SELL | MSG_MARKET_BUY | MSG_MARKET_SELL => {
            if data.len() < BASE_LEN + 8 {
                return Err(ParseError::Truncated);
            }
            let price = be_u32(&data[29..33]);
            let qty = be_u32(&data[33..37]) as u64;
            let side = if msg_type == MSG_LIMIT_BUY || msg_type == MSG_MARKET_BUY {
                Side::Buy
            } else {
                Side::Sell
            };
            let kind = if msg_type == MSG_MARKET_BUY || msg_type == MSG_MARKET_SELL {
                OrderKind::Market
            } else {
                OrderKind::Limit
            };
            (price, qty, side, kind, OrderStatus::New)
        }
        MSG_UPDATE => {
            if data.len() < BASE_LEN + 9 {
                return Err(ParseError::Truncated);
            }
            let price = be_u32(&data[29..33]);
            let qty = be_u32(&data[33..37]) as u64;
            let side = if data[37] == b'B' { Side::Buy } else { Side::Sell };
            (price, qty, side, OrderKind::Limit, OrderStatus::PartiallyFilled)
        }
        MSG_CANCEL => (0, 0, Side::Sell, OrderKind::Limit, OrderStatus::Cancelled),
        other => return Err(ParseError::UnknownType(other)),
    };

    if msg_type != MSG_CANCEL {
        if price == 0 {
            return Err(ParseError::ZeroPrice);
        }
        if qty == 0 {
            return Err(ParseError::ZeroQty);
        }
    }

    Ok(Order {
        id: OrderId::from_bytes(id),
        ticker: Ticker::from_bytes(ticker),
        timestamp,
        price,
        qty,
        side,
        kind,
        status,
    })
}
