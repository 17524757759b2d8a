//! Ingest Event Runner
//!
//! Sequential consumer for the two external signals the pipeline reacts
//! to: the one-time sink-ready signal and the repeatable batch-arrived
//! signal. Events are drained from a channel one at a time, in arrival
//! order, so `on_batch` never overlaps itself.
//!
//! # Architecture
//!
//! ```text
//! Feed poller ──> mpsc::Receiver ──> IngestRunner ──> IngestPipeline
//! ```

use tokio::sync::mpsc;
use tracing::{info, warn};

use super::pipeline::IngestPipeline;
use crate::application::ports::QuoteSink;
use crate::domain::quote::QuoteSnapshot;

/// How often to log progress counters.
const PROGRESS_EVERY_BATCHES: u64 = 100;

/// External signals delivered to the pipeline.
pub enum IngestEvent {
    /// One-time readiness signal carrying the sink handle.
    SinkReady(Box<dyn QuoteSink>),
    /// A newly arrived batch of raw quote snapshots.
    Batch(Vec<QuoteSnapshot>),
}

/// Drives an [`IngestPipeline`] from a channel of [`IngestEvent`]s.
pub struct IngestRunner {
    rx: mpsc::Receiver<IngestEvent>,
    pipeline: IngestPipeline,
}

impl IngestRunner {
    /// Create a runner over a fresh pipeline.
    #[must_use]
    pub fn new(rx: mpsc::Receiver<IngestEvent>) -> Self {
        Self {
            rx,
            pipeline: IngestPipeline::new(),
        }
    }

    /// Run until the event channel is closed.
    ///
    /// Returns the pipeline so callers can inspect its final state.
    pub async fn run(mut self) -> IngestPipeline {
        info!("Ingest runner started");
        let mut batches: u64 = 0;
        let mut forwarded: u64 = 0;
        let mut duplicates: u64 = 0;
        let mut malformed: u64 = 0;

        while let Some(event) = self.rx.recv().await {
            match event {
                IngestEvent::SinkReady(sink) => match self.pipeline.bind_sink(sink) {
                    Ok(()) => {}
                    Err(error) => {
                        warn!(error = %error, "Ignoring sink-ready signal");
                    }
                },

                IngestEvent::Batch(snapshots) => {
                    batches += 1;
                    match self.pipeline.on_batch(&snapshots) {
                        Ok(outcome) => {
                            forwarded += outcome.forwarded as u64;
                            duplicates += outcome.duplicates as u64;
                            malformed += outcome.malformed as u64;
                        }
                        Err(error) => {
                            // Watermark is unmoved, so the rows stay newer
                            // than it and a later batch can redeliver them.
                            warn!(error = %error, "Batch not committed");
                        }
                    }

                    if batches % PROGRESS_EVERY_BATCHES == 0 {
                        info!(
                            batches,
                            forwarded, duplicates, malformed, "Ingest progress"
                        );
                    }
                }
            }
        }

        info!(
            batches,
            forwarded, duplicates, malformed, "Ingest runner stopped"
        );
        self.pipeline
    }
}
