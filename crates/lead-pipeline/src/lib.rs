//! Lead normalization, enrichment, deduplication, and scoring.
//!
//! The `workflows::leads` module holds the transformation pipeline; `config`,
//! `telemetry`, and `error` carry the ambient pieces shared with the HTTP
//! service and CLI.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
