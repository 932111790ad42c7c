//! Error types. Every failure mode is an enumerated result kind; none of
//! them is fatal to the engine except failing to open the event log.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result kinds returned by book operations.
///
/// A rejected order is counted and dropped by the worker; it never aborts
/// the drain loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BookError {
    /// An order with the same id is already resting.
    #[error("duplicate order id")]
    DuplicateId,
    /// Cancel or modify targeted an id that is not resting.
    #[error("order not found")]
    OrderNotFound,
    /// Reserved. `Side` is a closed enum, so the book itself can never
    /// observe an invalid side; the parser rejects bad side bytes upstream.
    #[error("invalid side")]
    InvalidSide,
    /// Limit price above `MAX_PRICE`.
    #[error("price outside admissible range")]
    InvalidPrice,
    /// Reserved.
    #[error("no match")]
    NoMatch,
}

/// Wire-format rejection reasons. Parse failures are drops, counted by the
/// caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("message truncated")]
    Truncated,
    #[error("unknown message type {0:#04x}")]
    UnknownType(u8),
    #[error("priced message with zero price")]
    ZeroPrice,
    #[error("priced message with zero quantity")]
    ZeroQty,
}

/// Fatal engine-level failures.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to open event log {path}: {source}")]
    LogOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to spawn engine thread: {source}")]
    Spawn {
        #[source]
        source: io::Error,
    },
}
