//! Sentiflux - Batch sentiment reports for product review datasets
//!
//! Sentiflux turns a tabular file of reviews into a labelled report and
//! aggregate views through a deterministic pipeline: load/validate →
//! normalization → scoring → classification → aggregation → report sink.
//!
//! ## Modules
//!
//! - **Input**: CSV, JSON and JSON-lines sources, schema checks, deduplication
//!   and timestamp parsing
//! - **Pipeline**: Per-record normalization, scoring and labelling, run in parallel
//! - **Aggregation**: Label distribution, bucketed trend and top keywords
//! - **Output**: Report CSV, Vega-Lite chart specs and a run summary

pub mod adapters;
pub mod aggregator;
pub mod classifier;
pub mod config;
pub mod encoder;
pub mod error;
pub mod normalizer;
pub mod pipeline;
pub mod schema;
pub mod scoring;
pub mod sink;
pub mod types;

pub use aggregator::{Aggregator, AllowAllTokens, TokenFilter};
pub use classifier::{classify, Thresholds};
pub use config::ReportConfig;
pub use error::ReportError;
pub use normalizer::{normalize, NormalizeOptions, TextNormalizer};
pub use pipeline::{classify_records, run_report, ReportProcessor, SentimentPipeline};
pub use scoring::{LexiconScorer, SentimentScorer};
pub use sink::{FileReportSink, ReportSink};

/// Sentiflux version embedded in all artifacts
pub const SENTIFLUX_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for artifacts
pub const PRODUCER_NAME: &str = "sentiflux";
