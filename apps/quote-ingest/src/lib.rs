#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::default_trait_access,
        clippy::needless_pass_by_value,
        clippy::items_after_statements,
        clippy::option_if_let_else
    )
)]

//! Quote Ingest - Incremental Quote Feed Pipeline
//!
//! Turns a continuously arriving, possibly-overlapping stream of quote
//! snapshots into a monotonically growing, deduplicated columnar dataset
//! suitable for an external aggregation/visualization sink.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Pure quote types and the three leaf units
//!   - `quote`: Snapshot/record types and per-record decoding
//!   - `row`: Columnar projection and sink table configuration
//!   - `watermark`: Monotonic high-water timestamp tracking
//!   - `dedup`: Batch filtering against the watermark
//!
//! - **Application**: Use cases and port definitions
//!   - `ports`: Interfaces for the columnar sink and the upstream feed
//!   - `services`: The ingestion pipeline and its sequential event runner
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `feed`: HTTP polling client for the quote server
//!   - `sink`: In-memory columnar table sink
//!   - `config`: Environment-based configuration
//!   - `telemetry`: Tracing subscriber setup
//!
//! # Data Flow
//!
//! ```text
//! Quote server ──poll──> IngestEvent ──> IngestPipeline ──> QuoteSink
//!                                        decode → dedup → map → append
//!                                        └─> watermark advance
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Core quote types with no external I/O.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::dedup::retain_newer;
pub use domain::quote::{
    DecodeError, PriceSize, QuoteRecord, QuoteSnapshot, Symbol, Timestamp, TimestampValue,
};
pub use domain::row::{Aggregate, ColumnType, ColumnarRow, TableSchema, ViewConfig, ViewKind};
pub use domain::watermark::Watermark;

// Application ports and services
pub use application::ports::{FeedError, QuoteFeed, QuoteSink, SinkError};
pub use application::services::{
    BatchOutcome, IngestError, IngestEvent, IngestPipeline, IngestRunner,
};

// Infrastructure adapters
pub use infrastructure::config::IngestConfig;
pub use infrastructure::feed::{HttpQuoteFeed, poll_quotes};
pub use infrastructure::sink::{MemoryTableSink, TableHandle};
pub use infrastructure::telemetry::init as init_telemetry;
