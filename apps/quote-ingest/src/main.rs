//! Quote Ingest Binary
//!
//! Polls the quote server and feeds batches through the ingestion pipeline
//! into an in-memory columnar table.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin quote-ingest
//! ```
//!
//! # Environment Variables
//!
//! - `FEED_URL`: Quote server endpoint (default: <http://localhost:8080/query?id=1>)
//! - `FEED_POLL_INTERVAL_MS`: Poll interval in milliseconds (default: 100)
//! - `INGEST_CHANNEL_CAPACITY`: Event channel capacity (default: 1024)
//! - `RUST_LOG`: Log level (default: info)

use std::time::Duration;

use anyhow::Context;
use quote_ingest::infrastructure::telemetry;
use quote_ingest::{
    HttpQuoteFeed, IngestConfig, IngestEvent, IngestRunner, MemoryTableSink, poll_quotes,
};
use tokio::signal;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// How often to log the table size.
const TABLE_STATS_INTERVAL: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    telemetry::init();

    tracing::info!("Starting quote ingest service");

    let config = IngestConfig::from_env();
    tracing::info!(
        feed_url = %config.feed_url,
        poll_interval = ?config.poll_interval,
        channel_capacity = config.channel_capacity,
        "Configuration loaded"
    );

    let shutdown_token = CancellationToken::new();
    let (event_tx, event_rx) = mpsc::channel::<IngestEvent>(config.channel_capacity);

    // Bind the sink before the first batch can arrive.
    let sink = MemoryTableSink::new();
    let table = sink.handle();
    event_tx
        .send(IngestEvent::SinkReady(Box::new(sink)))
        .await
        .map_err(|_| anyhow::anyhow!("ingest channel closed before startup completed"))?;

    let runner = IngestRunner::new(event_rx);
    let runner_task = tokio::spawn(runner.run());

    let feed = HttpQuoteFeed::new(config.feed_url.clone());
    let poller_shutdown = shutdown_token.clone();
    let poller_task = tokio::spawn(poll_quotes(
        feed,
        config.poll_interval,
        event_tx,
        poller_shutdown,
    ));

    let stats_table = table.clone();
    let stats_shutdown = shutdown_token.clone();
    let stats_task = tokio::spawn(async move {
        loop {
            tokio::select! {
                () = tokio::time::sleep(TABLE_STATS_INTERVAL) => {
                    tracing::info!(rows = stats_table.len(), "Table size");
                }
                () = stats_shutdown.cancelled() => return,
            }
        }
    });

    tracing::info!("Quote ingest ready");

    await_shutdown(shutdown_token).await;

    // The poller drops the event sender on shutdown, which closes the
    // channel and lets the runner drain and stop.
    poller_task.await.context("quote poller task panicked")?;
    stats_task.await.context("table stats task panicked")?;
    let pipeline = runner_task.await.context("ingest runner task panicked")?;

    tracing::info!(
        rows = table.len(),
        watermark = ?pipeline.watermark().map(|ts| ts.to_rfc3339()),
        "Quote ingest stopped"
    );
    Ok(())
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
#[allow(clippy::expect_used)]
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    shutdown_token.cancel();
}
