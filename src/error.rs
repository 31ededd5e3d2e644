//! Error types for Sentiflux

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a report run.
///
/// Per-row problems (unparseable timestamps, texts that are too short after
/// normalization) are never errors; they are counted in
/// [`RunStats`](crate::types::RunStats) and the run continues.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Missing expected columns: {missing:?}. Columns present: {present:?}")]
    Schema {
        missing: Vec<String>,
        present: Vec<String>,
    },

    #[error("Unsupported file format: {0}. Use CSV, JSON or JSON lines")]
    UnsupportedFormat(String),

    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Failed reading data: {0}")]
    ParseError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}

impl ReportError {
    /// Build a schema error from the missing and present column names.
    pub fn schema<M, P>(missing: M, present: P) -> Self
    where
        M: IntoIterator,
        M::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        ReportError::Schema {
            missing: missing.into_iter().map(Into::into).collect(),
            present: present.into_iter().map(Into::into).collect(),
        }
    }
}
