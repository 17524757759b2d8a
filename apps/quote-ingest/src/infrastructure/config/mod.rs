//! Ingest Service Configuration
//!
//! Settings loaded from environment variables, with defaults matching the
//! local quote server.

use std::time::Duration;

/// Default quote server endpoint.
pub const DEFAULT_FEED_URL: &str = "http://localhost:8080/query?id=1";

/// Default poll interval in milliseconds.
const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Default ingest event channel capacity.
const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Configuration for the ingest service.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Quote server endpoint to poll.
    pub feed_url: String,
    /// Interval between polls.
    pub poll_interval: Duration,
    /// Capacity of the ingest event channel.
    pub channel_capacity: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl IngestConfig {
    /// Create config from environment variables.
    ///
    /// - `FEED_URL`: quote server endpoint
    /// - `FEED_POLL_INTERVAL_MS`: poll interval in milliseconds
    /// - `INGEST_CHANNEL_CAPACITY`: event channel capacity
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let feed_url = std::env::var("FEED_URL").unwrap_or(defaults.feed_url);

        let poll_interval = std::env::var("FEED_POLL_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map_or(defaults.poll_interval, Duration::from_millis);

        let channel_capacity = std::env::var("INGEST_CHANNEL_CAPACITY")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&capacity| capacity > 0)
            .unwrap_or(defaults.channel_capacity);

        Self {
            feed_url,
            poll_interval,
            channel_capacity,
        }
    }
}
