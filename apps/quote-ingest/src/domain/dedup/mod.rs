//! Batch Deduplication
//!
//! Filters a batch of decoded quote records against the current watermark.
//! Records at or below the watermark are treated as already seen.

use super::quote::{QuoteRecord, Timestamp};

/// Keep only records strictly newer than the watermark.
///
/// A record passes iff the watermark is unset or its timestamp is strictly
/// greater than the watermark. Equal-to-watermark records are dropped: the
/// strict inequality is what guarantees at-most-once delivery for a given
/// timestamp even when it reappears in a later batch. Input order is
/// preserved.
#[must_use]
pub fn retain_newer(batch: Vec<QuoteRecord>, watermark: Option<Timestamp>) -> Vec<QuoteRecord> {
    match watermark {
        None => batch,
        Some(mark) => batch
            .into_iter()
            .filter(|record| record.timestamp > mark)
            .collect(),
    }
}
