//! Application Services
//!
//! The ingestion pipeline composition root and the sequential event runner
//! that drives it.

pub mod pipeline;
pub mod runner;

pub use pipeline::{BatchOutcome, IngestError, IngestPipeline};
pub use runner::{IngestEvent, IngestRunner};
