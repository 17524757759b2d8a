//! Infrastructure Layer
//!
//! Adapters for the application ports: the HTTP quote feed, the in-memory
//! columnar table sink, environment configuration, and tracing setup.

pub mod config;
pub mod feed;
pub mod sink;
pub mod telemetry;
