//! Quote Snapshot Types
//!
//! Wire-shaped quote snapshots as delivered by the upstream server, and the
//! decoded records the pipeline operates on. Decoding is the single place a
//! malformed snapshot is rejected; everything downstream is total.
//!
//! # Wire Format (JSON)
//!
//! ```json
//! { "stock": "AAPL",
//!   "top_ask": { "price": 150.0, "size": 10.0 },
//!   "top_bid": { "price": 149.5, "size": 12.0 },
//!   "timestamp": "2024-01-02T15:04:05.000Z" }
//! ```
//!
//! `top_ask` and `top_bid` are optional: a one-sided book is a legitimate
//! market state, not an error. `timestamp` is RFC 3339 text or epoch
//! milliseconds.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod symbol;
pub mod timestamp;

pub use symbol::Symbol;
pub use timestamp::Timestamp;

// =============================================================================
// Wire Types
// =============================================================================

/// One side of the book: best price and resting size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSize {
    /// Best price on this side.
    pub price: Decimal,
    /// Size resting at that price.
    pub size: Decimal,
}

/// A timestamp as received on the wire.
///
/// The upstream server sends RFC 3339 text; epoch milliseconds are also
/// accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimestampValue {
    /// Unix epoch milliseconds.
    Millis(i64),
    /// RFC 3339 / ISO 8601 text.
    Text(String),
}

/// One raw upstream snapshot for a stock symbol, as received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    /// Stock identifier.
    pub stock: String,

    /// Best ask, absent if no ask quote exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_ask: Option<PriceSize>,

    /// Best bid, absent if no bid quote exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_bid: Option<PriceSize>,

    /// Snapshot instant.
    pub timestamp: TimestampValue,
}

// =============================================================================
// Decoding
// =============================================================================

/// Reasons a single snapshot is rejected during decoding.
///
/// A decode failure rejects that record alone; the rest of the batch is
/// still processed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The timestamp could not be parsed as an instant.
    #[error("malformed timestamp {raw:?} for stock {stock:?}")]
    MalformedTimestamp {
        /// Stock identifier of the rejected snapshot.
        stock: String,
        /// The raw timestamp value as received.
        raw: String,
    },

    /// The stock identifier was empty.
    #[error("empty stock symbol")]
    EmptySymbol,
}

impl QuoteSnapshot {
    /// Decode into a [`QuoteRecord`] with a parsed timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::MalformedTimestamp`] if the timestamp cannot
    /// be parsed, or [`DecodeError::EmptySymbol`] if the stock identifier
    /// is empty.
    pub fn decode(&self) -> Result<QuoteRecord, DecodeError> {
        if self.stock.trim().is_empty() {
            return Err(DecodeError::EmptySymbol);
        }

        let timestamp = match &self.timestamp {
            TimestampValue::Text(raw) => {
                Timestamp::parse(raw).map_err(|_| DecodeError::MalformedTimestamp {
                    stock: self.stock.clone(),
                    raw: raw.clone(),
                })?
            }
            TimestampValue::Millis(millis) => Timestamp::from_unix_millis(*millis).ok_or_else(
                || DecodeError::MalformedTimestamp {
                    stock: self.stock.clone(),
                    raw: millis.to_string(),
                },
            )?,
        };

        Ok(QuoteRecord {
            stock: Symbol::new(&self.stock),
            top_ask: self.top_ask,
            top_bid: self.top_bid,
            timestamp,
        })
    }
}

// =============================================================================
// Decoded Record
// =============================================================================

/// A decoded quote snapshot, immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRecord {
    /// Stock symbol.
    pub stock: Symbol,
    /// Best ask, if one exists.
    pub top_ask: Option<PriceSize>,
    /// Best bid, if one exists.
    pub top_bid: Option<PriceSize>,
    /// Snapshot instant.
    pub timestamp: Timestamp,
}
