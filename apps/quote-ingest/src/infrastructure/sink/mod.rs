//! In-Memory Table Sink
//!
//! A [`QuoteSink`] that keeps appended rows and the bound schema/view in
//! process memory. Stands in for an external aggregation engine in the
//! binary and the test suite; observers read the table through a shared
//! [`TableHandle`].

use std::sync::Arc;

use parking_lot::RwLock;

use crate::application::ports::{QuoteSink, SinkError};
use crate::domain::row::{ColumnarRow, TableSchema, ViewConfig};

/// Shared read access to the rows held by a [`MemoryTableSink`].
#[derive(Debug, Clone)]
pub struct TableHandle {
    rows: Arc<RwLock<Vec<ColumnarRow>>>,
}

impl TableHandle {
    /// Number of rows appended so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    /// Copy of all rows, in append order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ColumnarRow> {
        self.rows.read().clone()
    }
}

/// In-memory columnar table implementing the sink contract.
#[derive(Debug)]
pub struct MemoryTableSink {
    schema: Option<TableSchema>,
    view: Option<ViewConfig>,
    rows: Arc<RwLock<Vec<ColumnarRow>>>,
}

impl MemoryTableSink {
    /// Create an empty, unconfigured table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            schema: None,
            view: None,
            rows: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// A shared handle for reading the table from outside the pipeline.
    #[must_use]
    pub fn handle(&self) -> TableHandle {
        TableHandle {
            rows: Arc::clone(&self.rows),
        }
    }

    /// The bound schema, once configured.
    #[must_use]
    pub const fn schema(&self) -> Option<&TableSchema> {
        self.schema.as_ref()
    }

    /// The bound view configuration, once configured.
    #[must_use]
    pub const fn view(&self) -> Option<&ViewConfig> {
        self.view.as_ref()
    }
}

impl Default for MemoryTableSink {
    fn default() -> Self {
        Self::new()
    }
}

impl QuoteSink for MemoryTableSink {
    fn configure(&mut self, schema: &TableSchema, view: &ViewConfig) -> Result<(), SinkError> {
        self.schema = Some(schema.clone());
        self.view = Some(view.clone());
        Ok(())
    }

    fn append(&mut self, rows: &[ColumnarRow]) -> Result<(), SinkError> {
        if self.schema.is_none() {
            return Err(SinkError::NotConfigured);
        }

        self.rows.write().extend_from_slice(rows);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::quote::Timestamp;
    use rust_decimal_macros::dec;

    fn row(stock: &str, millis: i64) -> ColumnarRow {
        ColumnarRow {
            stock: stock.to_string(),
            top_ask_price: dec!(150.00),
            top_bid_price: dec!(149.50),
            timestamp: Timestamp::from_unix_millis(millis).unwrap(),
        }
    }

    #[test]
    fn append_before_configure_is_rejected() {
        let mut sink = MemoryTableSink::new();
        let err = sink.append(&[row("AAPL", 100)]).unwrap_err();
        assert_eq!(err, SinkError::NotConfigured);
    }

    #[test]
    fn configure_stores_schema_and_view() {
        let mut sink = MemoryTableSink::new();
        sink.configure(&TableSchema::quotes(), &ViewConfig::quotes())
            .unwrap();

        assert_eq!(sink.schema(), Some(&TableSchema::quotes()));
        assert_eq!(sink.view(), Some(&ViewConfig::quotes()));
    }

    #[test]
    fn append_preserves_order_across_batches() {
        let mut sink = MemoryTableSink::new();
        let table = sink.handle();
        sink.configure(&TableSchema::quotes(), &ViewConfig::quotes())
            .unwrap();

        sink.append(&[row("AAPL", 1), row("MSFT", 3)]).unwrap();
        sink.append(&[row("GOOGL", 2)]).unwrap();

        let stocks: Vec<String> = table.snapshot().into_iter().map(|r| r.stock).collect();
        assert_eq!(stocks, vec!["AAPL", "MSFT", "GOOGL"]);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn handle_observes_appends() {
        let mut sink = MemoryTableSink::new();
        let table = sink.handle();
        sink.configure(&TableSchema::quotes(), &ViewConfig::quotes())
            .unwrap();

        assert!(table.is_empty());
        sink.append(&[row("AAPL", 100)]).unwrap();
        assert_eq!(table.len(), 1);
    }
}
