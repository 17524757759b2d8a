//! Watermark Tracking
//!
//! Holds the most recent timestamp already committed to the sink. Starts
//! unset (accept everything) and only ever moves forward.

use super::quote::Timestamp;

/// The highest timestamp already forwarded to the sink.
///
/// Invariant: once set, the held value never decreases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Watermark {
    latest: Option<Timestamp>,
}

impl Watermark {
    /// Create an unset watermark.
    #[must_use]
    pub const fn new() -> Self {
        Self { latest: None }
    }

    /// The currently held timestamp, if any.
    #[must_use]
    pub const fn current(&self) -> Option<Timestamp> {
        self.latest
    }

    /// Advance to `candidate` if it is strictly greater than the held value
    /// (or nothing is held yet); otherwise a no-op.
    pub fn advance(&mut self, candidate: Timestamp) {
        match self.latest {
            Some(held) if candidate <= held => {}
            _ => self.latest = Some(candidate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ts(millis: i64) -> Timestamp {
        Timestamp::from_unix_millis(millis).unwrap()
    }

    #[test]
    fn starts_unset() {
        let mark = Watermark::new();
        assert_eq!(mark.current(), None);
    }

    #[test]
    fn first_advance_sets_value() {
        let mut mark = Watermark::new();
        mark.advance(ts(100));
        assert_eq!(mark.current(), Some(ts(100)));
    }

    #[test]
    fn advance_to_greater_moves_forward() {
        let mut mark = Watermark::new();
        mark.advance(ts(100));
        mark.advance(ts(101));
        assert_eq!(mark.current(), Some(ts(101)));
    }

    #[test]
    fn advance_to_equal_is_noop() {
        let mut mark = Watermark::new();
        mark.advance(ts(100));
        mark.advance(ts(100));
        assert_eq!(mark.current(), Some(ts(100)));
    }

    #[test]
    fn advance_to_smaller_is_noop() {
        let mut mark = Watermark::new();
        mark.advance(ts(100));
        mark.advance(ts(50));
        assert_eq!(mark.current(), Some(ts(100)));
    }

    proptest! {
        #[test]
        fn advance_never_decreases(
            candidates in proptest::collection::vec(0i64..4_000_000_000_000i64, 1..64)
        ) {
            let mut mark = Watermark::new();
            let mut previous = None;

            for millis in candidates {
                mark.advance(ts(millis));
                let current = mark.current();
                prop_assert!(current >= previous);
                prop_assert!(current.is_some());
                previous = current;
            }
        }
    }
}
