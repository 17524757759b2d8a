//! Columnar Row Projection
//!
//! The fixed-schema row shape the sink accepts, the projection from a
//! decoded quote record, and the static table/view configuration applied
//! once when the sink is bound.

use rust_decimal::Decimal;
use serde::Serialize;

use super::quote::{QuoteRecord, Timestamp};

// =============================================================================
// Columnar Row
// =============================================================================

/// The fixed projection consumed by the sink, derived one-to-one from an
/// accepted quote record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnarRow {
    /// Stock identifier.
    pub stock: String,
    /// Best ask price, zero when no ask quote exists.
    pub top_ask_price: Decimal,
    /// Best bid price, zero when no bid quote exists.
    pub top_bid_price: Decimal,
    /// Snapshot instant, copied verbatim from the source record.
    pub timestamp: Timestamp,
}

impl ColumnarRow {
    /// Project a decoded quote record into the sink schema.
    ///
    /// A missing ask or bid side maps to a zero price. That substitution is
    /// a business rule, not an error path: a one-sided book is a legitimate
    /// market state.
    #[must_use]
    pub fn from_record(record: &QuoteRecord) -> Self {
        Self {
            stock: record.stock.as_str().to_string(),
            top_ask_price: record.top_ask.map_or(Decimal::ZERO, |side| side.price),
            top_bid_price: record.top_bid.map_or(Decimal::ZERO, |side| side.price),
            timestamp: record.timestamp,
        }
    }
}

// =============================================================================
// Table Schema
// =============================================================================

/// Column types understood by the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// String column.
    Text,
    /// Floating-point column.
    Float,
    /// Date/time column.
    Date,
}

/// The sink's target table schema: ordered column names and types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    /// Ordered `(name, type)` column pairs.
    pub columns: Vec<(String, ColumnType)>,
}

impl TableSchema {
    /// The fixed quote table schema.
    #[must_use]
    pub fn quotes() -> Self {
        Self {
            columns: vec![
                ("stock".to_string(), ColumnType::Text),
                ("top_ask_price".to_string(), ColumnType::Float),
                ("top_bid_price".to_string(), ColumnType::Float),
                ("timestamp".to_string(), ColumnType::Date),
            ],
        }
    }
}

// =============================================================================
// View Configuration
// =============================================================================

/// How the sink should render the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    /// Time-series line chart.
    TimeSeriesLine,
}

/// Per-column aggregation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    /// Arithmetic mean.
    Average,
    /// Count of distinct values.
    DistinctCount,
}

/// Static display configuration, applied once at sink binding time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewConfig {
    /// View rendering kind.
    pub kind: ViewKind,
    /// Row grouping key.
    pub row_pivot: String,
    /// Column grouping key.
    pub column_pivot: String,
    /// Displayed measure columns.
    pub columns: Vec<String>,
    /// Aggregation rule per field.
    pub aggregates: Vec<(String, Aggregate)>,
}

impl ViewConfig {
    /// The fixed quote view: price over time, one series per stock.
    #[must_use]
    pub fn quotes() -> Self {
        Self {
            kind: ViewKind::TimeSeriesLine,
            row_pivot: "timestamp".to_string(),
            column_pivot: "stock".to_string(),
            columns: vec!["top_ask_price".to_string()],
            aggregates: vec![
                ("stock".to_string(), Aggregate::DistinctCount),
                ("top_ask_price".to_string(), Aggregate::Average),
                ("top_bid_price".to_string(), Aggregate::Average),
                ("timestamp".to_string(), Aggregate::DistinctCount),
            ],
        }
    }
}
