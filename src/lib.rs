//! # Crossbook
//!
//! A sharded, in-memory limit-order-book exchange simulator with an
//! asynchronous event log.
//!
//! ## Design Principles
//!
//! - **Single-Writer Books**: every symbol's book is owned by exactly one
//!   worker thread (no locks around book state)
//! - **O(1) Hot Path**: add, cancel, modify and per-fill matching all run
//!   in constant time via a stable-handle arena FIFO
//! - **Lock-Free Hand-Off**: shard and log queues are lock-free
//!   multi-producer queues; producers never block
//! - **No I/O in the Book**: operations emit events into a buffer; a
//!   dedicated writer thread serializes them to the log
//!
//! ## Architecture
//!
//! ```text
//! [Feed] -> [Dispatcher] -> [Shard Queue]_k -> [Worker_k] -> [Book_sym]
//!                                                   |
//!                                             [Logger Queue] -> [Log Writer]
//! ```
//!
//! Tickers are partitioned into buckets by a pure function of their
//! leading characters; each bucket belongs to one worker, so per-symbol
//! FIFO ordering holds without cross-symbol contention.
//!
//! ## Example
//!
//! ```rust,no_run
//! use crossbook::{Exchange, ExchangeConfig, Ticker};
//!
//! let config = ExchangeConfig::new("events.log")
//!     .with_symbols([Ticker::new(b"AAPL")]);
//! let mut exchange = Exchange::start(config).unwrap();
//!
//! // Feed raw wire frames as they arrive.
//! // exchange.on_message(&frame);
//!
//! exchange.stop();
//! ```

pub mod arena;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod events;
pub mod logger;
pub mod metrics;
pub mod order_book;
pub mod parser;
pub mod price_level;
pub mod types;

mod matching;
mod worker;

// Re-exports for convenience
pub use arena::{Arena, ArenaIndex, OrderNode, NULL_INDEX};
pub use dispatch::{bucket_of, Dispatcher, BUCKET_LABELS};
pub use engine::{Exchange, ExchangeConfig, NUM_WORKERS};
pub use error::{BookError, EngineError, ParseError};
pub use events::{Counterparty, Event, EventKind};
pub use logger::{EventLogger, EventSink};
pub use metrics::Metrics;
pub use order_book::OrderBook;
pub use parser::parse_message;
pub use price_level::PriceLevel;
pub use types::{
    Order, OrderId, OrderKind, OrderStatus, Side, Ticker, MAX_PRICE, ORDER_ID_LEN, TICKER_LEN,
};
