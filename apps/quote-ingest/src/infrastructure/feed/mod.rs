//! Upstream Quote Feed Adapter
//!
//! HTTP polling client for the quote server. Each poll fetches one JSON
//! array of quote snapshots and becomes one batch event. There is no
//! reconnection logic: a failed poll is logged and the next tick proceeds.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::application::ports::{FeedError, QuoteFeed};
use crate::application::services::IngestEvent;
use crate::domain::quote::QuoteSnapshot;

/// HTTP client for the quote server's snapshot endpoint.
pub struct HttpQuoteFeed {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpQuoteFeed {
    /// Create a feed polling the given endpoint.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// The polled endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl QuoteFeed for HttpQuoteFeed {
    async fn next_batch(&mut self) -> Result<Vec<QuoteSnapshot>, FeedError> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|error| FeedError::Transport {
                message: error.to_string(),
            })?;

        response
            .json::<Vec<QuoteSnapshot>>()
            .await
            .map_err(|error| FeedError::Decode {
                message: error.to_string(),
            })
    }
}

/// Poll the feed on a fixed interval, forwarding non-empty batches as
/// [`IngestEvent::Batch`] until shutdown is requested or the channel
/// closes.
pub async fn poll_quotes(
    mut feed: impl QuoteFeed,
    interval: Duration,
    events: mpsc::Sender<IngestEvent>,
    shutdown: CancellationToken,
) {
    info!(poll_interval = ?interval, "Quote poller started");

    loop {
        tokio::select! {
            () = tokio::time::sleep(interval) => {}
            () = shutdown.cancelled() => {
                info!("Quote poller shutting down");
                return;
            }
        }

        match feed.next_batch().await {
            Ok(batch) => {
                if batch.is_empty() {
                    continue;
                }
                if events.send(IngestEvent::Batch(batch)).await.is_err() {
                    warn!("Ingest channel closed, stopping poller");
                    return;
                }
            }
            Err(error) => {
                warn!(error = %error, "Quote poll failed");
            }
        }
    }
}
