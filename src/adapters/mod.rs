//! Input format adapters
//!
//! This module provides adapters that parse the two supported tabular
//! encodings into a [`RawTable`]: row-delimited CSV and record-delimited JSON
//! (a JSON array of objects, or one object per line).

mod csv_adapter;
mod json_adapter;

pub use csv_adapter::CsvAdapter;
pub use json_adapter::{JsonArrayAdapter, JsonLinesAdapter};

use crate::error::ReportError;
use crate::schema::RawTable;
use serde::Serialize;
use std::path::Path;

/// Trait for input format adapters
pub trait TableAdapter: Sync {
    /// Parse raw file content into columns and rows
    fn parse(&self, raw: &str) -> Result<RawTable, ReportError>;
}

/// Supported input encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    Csv,
    Json,
    JsonLines,
}

impl InputFormat {
    /// Pick the encoding from the file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Result<Self, ReportError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(InputFormat::Csv),
            "json" => Ok(InputFormat::Json),
            "jsonl" | "ndjson" => Ok(InputFormat::JsonLines),
            _ => Err(ReportError::UnsupportedFormat(path.display().to_string())),
        }
    }

    pub fn adapter(&self) -> &'static dyn TableAdapter {
        match self {
            InputFormat::Csv => &CsvAdapter,
            InputFormat::Json => &JsonArrayAdapter,
            InputFormat::JsonLines => &JsonLinesAdapter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            InputFormat::from_path(Path::new("data/Reviews.CSV")).unwrap(),
            InputFormat::Csv
        );
        assert_eq!(
            InputFormat::from_path(Path::new("reviews.json")).unwrap(),
            InputFormat::Json
        );
        assert_eq!(
            InputFormat::from_path(Path::new("reviews.jsonl")).unwrap(),
            InputFormat::JsonLines
        );
        assert_eq!(
            InputFormat::from_path(Path::new("reviews.ndjson")).unwrap(),
            InputFormat::JsonLines
        );
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(matches!(
            InputFormat::from_path(Path::new("reviews.xlsx")),
            Err(ReportError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            InputFormat::from_path(Path::new("reviews")),
            Err(ReportError::UnsupportedFormat(_))
        ));
    }
}
