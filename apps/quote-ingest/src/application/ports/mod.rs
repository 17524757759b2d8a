//! Port Interfaces
//!
//! Contracts for the two external systems the pipeline touches, following
//! the Hexagonal Architecture pattern. Infrastructure adapters implement
//! these.
//!
//! ## Driven Ports (Outbound)
//!
//! - [`QuoteSink`]: the columnar aggregation/visualization component
//!
//! ## Driver-side Ports (Inbound data)
//!
//! - [`QuoteFeed`]: the upstream source of quote snapshot batches

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::quote::QuoteSnapshot;
use crate::domain::row::{ColumnarRow, TableSchema, ViewConfig};

#[cfg(test)]
use mockall::automock;

// =============================================================================
// Sink Port
// =============================================================================

/// Errors produced by a sink adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    /// Rows were appended before the sink was configured.
    #[error("sink is not configured")]
    NotConfigured,

    /// The sink rejected the call.
    #[error("sink unavailable: {message}")]
    Unavailable {
        /// Adapter-specific failure description.
        message: String,
    },
}

/// The external columnar aggregation/visualization component.
///
/// Append is ordered and additive: no upsert or replace semantics. Calls
/// are synchronous from the pipeline's point of view; retries and
/// durability are the sink's concern.
#[cfg_attr(test, automock)]
pub trait QuoteSink: Send {
    /// Apply the static table schema and display configuration.
    ///
    /// Called exactly once, when the pipeline binds the sink.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the sink rejects the configuration.
    fn configure(&mut self, schema: &TableSchema, view: &ViewConfig) -> Result<(), SinkError>;

    /// Append rows in order, as a single batch.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the rows were not observably accepted.
    fn append(&mut self, rows: &[ColumnarRow]) -> Result<(), SinkError>;
}

// =============================================================================
// Feed Port
// =============================================================================

/// Errors produced by a feed adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    /// The upstream transport failed.
    #[error("feed transport error: {message}")]
    Transport {
        /// Adapter-specific failure description.
        message: String,
    },

    /// The upstream payload could not be decoded as a snapshot batch.
    #[error("feed decode error: {message}")]
    Decode {
        /// Adapter-specific failure description.
        message: String,
    },
}

/// The upstream source of quote snapshot batches.
#[async_trait]
pub trait QuoteFeed: Send {
    /// Fetch the next batch of raw quote snapshots.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError`] if the fetch or payload decoding fails.
    async fn next_batch(&mut self) -> Result<Vec<QuoteSnapshot>, FeedError>;
}
