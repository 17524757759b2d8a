//! Ingestion Pipeline
//!
//! The composition root: on each batch, decode the raw snapshots, drop
//! records at or below the watermark, project survivors to columnar rows,
//! forward them to the sink in one append, then advance the watermark.
//!
//! The pipeline has two externally visible states. It starts
//! **Uninitialized** (no sink bound): batches are accepted but dropped and
//! the watermark does not move. Binding a sink makes it **Active** for the
//! rest of the process lifetime.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::application::ports::{QuoteSink, SinkError};
use crate::domain::dedup;
use crate::domain::quote::{QuoteSnapshot, Timestamp};
use crate::domain::row::{ColumnarRow, TableSchema, ViewConfig};
use crate::domain::watermark::Watermark;

// =============================================================================
// Errors
// =============================================================================

/// Errors surfaced to the caller of [`IngestPipeline::on_batch`] and
/// [`IngestPipeline::bind_sink`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    /// The bound sink rejected a configure or append call. The watermark is
    /// not advanced when an append fails.
    #[error("sink unavailable: {0}")]
    SinkUnavailable(#[from] SinkError),

    /// A second sink binding was attempted.
    #[error("pipeline is already active")]
    AlreadyActive,
}

// =============================================================================
// Batch Outcome
// =============================================================================

/// Per-batch ingestion counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Rows forwarded to the sink.
    pub forwarded: usize,
    /// Records dropped as at-or-below the watermark.
    pub duplicates: usize,
    /// Records rejected individually during decoding.
    pub malformed: usize,
    /// Records dropped because no sink was bound yet.
    pub dropped: usize,
}

impl BatchOutcome {
    /// Whether the batch produced no sink traffic.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.forwarded == 0
    }
}

// =============================================================================
// Pipeline
// =============================================================================

/// The ingestion pipeline, sole owner of the watermark and the sink
/// binding.
pub struct IngestPipeline {
    watermark: Watermark,
    sink: Option<Box<dyn QuoteSink>>,
}

impl IngestPipeline {
    /// Create an Uninitialized pipeline with an unset watermark.
    #[must_use]
    pub fn new() -> Self {
        Self {
            watermark: Watermark::new(),
            sink: None,
        }
    }

    /// Whether a sink has been bound.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.sink.is_some()
    }

    /// The current watermark, if any batch has been committed.
    #[must_use]
    pub const fn watermark(&self) -> Option<Timestamp> {
        self.watermark.current()
    }

    /// Bind the sink and apply the static table and view configuration.
    ///
    /// Transitions Uninitialized → Active exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::AlreadyActive`] if a sink is already bound,
    /// or [`IngestError::SinkUnavailable`] if configuration is rejected.
    pub fn bind_sink(&mut self, mut sink: Box<dyn QuoteSink>) -> Result<(), IngestError> {
        if self.sink.is_some() {
            return Err(IngestError::AlreadyActive);
        }

        sink.configure(&TableSchema::quotes(), &ViewConfig::quotes())?;
        self.sink = Some(sink);

        info!("Sink bound, pipeline active");
        Ok(())
    }

    /// Process one externally delivered batch of quote snapshots.
    ///
    /// Replaying an already-fully-seen batch is a true no-op: no sink call,
    /// no watermark change.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::SinkUnavailable`] if the sink rejects the
    /// append; the watermark is left unmoved so the rows remain newer than
    /// it and can be redelivered.
    pub fn on_batch(&mut self, batch: &[QuoteSnapshot]) -> Result<BatchOutcome, IngestError> {
        let Some(sink) = self.sink.as_mut() else {
            if !batch.is_empty() {
                debug!(
                    records = batch.len(),
                    "Batch received before sink binding, dropping"
                );
            }
            return Ok(BatchOutcome {
                dropped: batch.len(),
                ..BatchOutcome::default()
            });
        };

        let mut malformed = 0usize;
        let mut records = Vec::with_capacity(batch.len());
        for snapshot in batch {
            match snapshot.decode() {
                Ok(record) => records.push(record),
                Err(error) => {
                    malformed += 1;
                    warn!(error = %error, "Skipping undecodable quote snapshot");
                }
            }
        }

        let decoded = records.len();
        let fresh = dedup::retain_newer(records, self.watermark.current());
        let duplicates = decoded - fresh.len();

        if fresh.is_empty() {
            return Ok(BatchOutcome {
                duplicates,
                malformed,
                ..BatchOutcome::default()
            });
        }

        let rows: Vec<ColumnarRow> = fresh.iter().map(ColumnarRow::from_record).collect();
        sink.append(&rows)?;

        // Every survivor is strictly newer than the watermark, so the batch
        // maximum strictly advances it.
        if let Some(max_timestamp) = fresh.iter().map(|record| record.timestamp).max() {
            self.watermark.advance(max_timestamp);
        }

        debug!(
            forwarded = rows.len(),
            duplicates, malformed, "Batch forwarded to sink"
        );

        Ok(BatchOutcome {
            forwarded: rows.len(),
            duplicates,
            malformed,
            dropped: 0,
        })
    }
}

impl Default for IngestPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockQuoteSink;
    use crate::domain::quote::{PriceSize, TimestampValue};
    use mockall::predicate;
    use rust_decimal_macros::dec;

    fn snapshot(stock: &str, millis: i64) -> QuoteSnapshot {
        QuoteSnapshot {
            stock: stock.to_string(),
            top_ask: Some(PriceSize {
                price: dec!(150.00),
                size: dec!(10),
            }),
            top_bid: Some(PriceSize {
                price: dec!(149.50),
                size: dec!(12),
            }),
            timestamp: TimestampValue::Millis(millis),
        }
    }

    fn ts(millis: i64) -> Timestamp {
        Timestamp::from_unix_millis(millis).unwrap()
    }

    fn bound_pipeline(sink: MockQuoteSink) -> IngestPipeline {
        let mut pipeline = IngestPipeline::new();
        pipeline.bind_sink(Box::new(sink)).unwrap();
        pipeline
    }

    fn accepting_sink() -> MockQuoteSink {
        let mut sink = MockQuoteSink::new();
        sink.expect_configure().times(1).returning(|_, _| Ok(()));
        sink
    }

    #[test]
    fn uninitialized_pipeline_drops_batches() {
        let mut pipeline = IngestPipeline::new();

        let outcome = pipeline.on_batch(&[snapshot("AAPL", 100)]).unwrap();

        assert_eq!(outcome.dropped, 1);
        assert!(outcome.is_noop());
        assert_eq!(pipeline.watermark(), None);
        assert!(!pipeline.is_active());
    }

    #[test]
    fn bind_sink_applies_static_configuration() {
        let mut sink = MockQuoteSink::new();
        sink.expect_configure()
            .with(
                predicate::eq(TableSchema::quotes()),
                predicate::eq(ViewConfig::quotes()),
            )
            .times(1)
            .returning(|_, _| Ok(()));

        let mut pipeline = IngestPipeline::new();
        pipeline.bind_sink(Box::new(sink)).unwrap();
        assert!(pipeline.is_active());
    }

    #[test]
    fn bind_sink_twice_is_rejected() {
        let mut pipeline = bound_pipeline(accepting_sink());

        let second = MockQuoteSink::new();
        let err = pipeline.bind_sink(Box::new(second)).unwrap_err();
        assert_eq!(err, IngestError::AlreadyActive);
    }

    #[test]
    fn bind_sink_propagates_configure_failure() {
        let mut sink = MockQuoteSink::new();
        sink.expect_configure().times(1).returning(|_, _| {
            Err(SinkError::Unavailable {
                message: "refused".to_string(),
            })
        });

        let mut pipeline = IngestPipeline::new();
        let err = pipeline.bind_sink(Box::new(sink)).unwrap_err();
        assert!(matches!(err, IngestError::SinkUnavailable(_)));
        assert!(!pipeline.is_active());
    }

    #[test]
    fn batch_is_forwarded_in_one_append_and_advances_watermark() {
        let mut sink = accepting_sink();
        sink.expect_append()
            .withf(|rows: &[ColumnarRow]| rows.len() == 2)
            .times(1)
            .returning(|_| Ok(()));

        let mut pipeline = bound_pipeline(sink);
        let outcome = pipeline
            .on_batch(&[snapshot("AAPL", 100), snapshot("MSFT", 101)])
            .unwrap();

        assert_eq!(outcome.forwarded, 2);
        assert_eq!(pipeline.watermark(), Some(ts(101)));
    }

    #[test]
    fn fully_seen_batch_is_a_noop() {
        let mut sink = accepting_sink();
        sink.expect_append().times(1).returning(|_| Ok(()));

        let mut pipeline = bound_pipeline(sink);
        let batch = vec![snapshot("AAPL", 100)];

        pipeline.on_batch(&batch).unwrap();
        // Mock would panic on a second append.
        let outcome = pipeline.on_batch(&batch).unwrap();

        assert!(outcome.is_noop());
        assert_eq!(outcome.duplicates, 1);
        assert_eq!(pipeline.watermark(), Some(ts(100)));
    }

    #[test]
    fn empty_batch_is_a_noop() {
        let mut pipeline = bound_pipeline(accepting_sink());
        let outcome = pipeline.on_batch(&[]).unwrap();
        assert_eq!(outcome, BatchOutcome::default());
    }

    #[test]
    fn overlapping_batch_forwards_only_newer_records() {
        let mut sink = accepting_sink();
        sink.expect_append()
            .withf(|rows: &[ColumnarRow]| rows.len() == 1 && rows[0].timestamp.unix_millis() == 100)
            .times(1)
            .returning(|_| Ok(()));
        sink.expect_append()
            .withf(|rows: &[ColumnarRow]| {
                rows.len() == 1
                    && rows[0].timestamp.unix_millis() == 101
                    && rows[0].top_ask_price == dec!(151.0)
            })
            .times(1)
            .returning(|_| Ok(()));

        let mut pipeline = bound_pipeline(sink);

        pipeline.on_batch(&[snapshot("AAPL", 100)]).unwrap();

        let newer = QuoteSnapshot {
            top_ask: Some(PriceSize {
                price: dec!(151.0),
                size: dec!(10),
            }),
            ..snapshot("AAPL", 101)
        };
        let outcome = pipeline
            .on_batch(&[snapshot("AAPL", 100), newer])
            .unwrap();

        assert_eq!(outcome.forwarded, 1);
        assert_eq!(outcome.duplicates, 1);
        assert_eq!(pipeline.watermark(), Some(ts(101)));
    }

    #[test]
    fn order_preserved_and_watermark_takes_the_maximum() {
        let mut sink = accepting_sink();
        sink.expect_append()
            .withf(|rows: &[ColumnarRow]| {
                let millis: Vec<i64> = rows.iter().map(|r| r.timestamp.unix_millis()).collect();
                millis == vec![1, 3, 2]
            })
            .times(1)
            .returning(|_| Ok(()));

        let mut pipeline = bound_pipeline(sink);
        pipeline
            .on_batch(&[snapshot("A", 1), snapshot("B", 3), snapshot("C", 2)])
            .unwrap();

        assert_eq!(pipeline.watermark(), Some(ts(3)));
    }

    #[test]
    fn malformed_record_is_skipped_rest_processed() {
        let mut sink = accepting_sink();
        sink.expect_append()
            .withf(|rows: &[ColumnarRow]| rows.len() == 1 && rows[0].stock == "MSFT")
            .times(1)
            .returning(|_| Ok(()));

        let mut pipeline = bound_pipeline(sink);

        let bad = QuoteSnapshot {
            timestamp: TimestampValue::Text("garbage".to_string()),
            ..snapshot("AAPL", 0)
        };
        let outcome = pipeline.on_batch(&[bad, snapshot("MSFT", 100)]).unwrap();

        assert_eq!(outcome.malformed, 1);
        assert_eq!(outcome.forwarded, 1);
        assert_eq!(pipeline.watermark(), Some(ts(100)));
    }

    #[test]
    fn failed_append_leaves_watermark_unmoved() {
        let mut sink = accepting_sink();
        sink.expect_append().times(1).returning(|_| {
            Err(SinkError::Unavailable {
                message: "connection reset".to_string(),
            })
        });

        let mut pipeline = bound_pipeline(sink);
        let err = pipeline.on_batch(&[snapshot("AAPL", 100)]).unwrap_err();

        assert!(matches!(err, IngestError::SinkUnavailable(_)));
        assert_eq!(pipeline.watermark(), None);
    }
}
