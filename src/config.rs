//! Run configuration
//!
//! A [`ReportConfig`] is built once (defaults, TOML file, CLI overrides),
//! validated before any I/O, and then passed by reference into the loader,
//! normalizer, classifier and aggregator.

use crate::classifier::Thresholds;
use crate::error::ReportError;
use crate::normalizer::NormalizeOptions;
use crate::types::DateGrain;
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default number of keywords in the ranking
pub const DEFAULT_TOP_N_KEYWORDS: usize = 20;

/// Default minimum normalized text length (characters)
pub const DEFAULT_MIN_TEXT_LEN: usize = 3;

/// How the time column is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFormat {
    /// Epoch offsets in seconds, falling back to milliseconds for the whole
    /// column when second-based values leave the representable range
    Epoch,
    /// Free-form date/time text
    Text,
}

/// Source column names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub id: String,
    pub text: String,
    pub time: String,
    pub summary: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            id: "Id".to_string(),
            text: "Text".to_string(),
            time: "Time".to_string(),
            summary: "Summary".to_string(),
        }
    }
}

/// Immutable configuration for one report run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    pub report_file_name: String,
    pub time_format: TimeFormat,
    pub date_grain: DateGrain,
    /// First day of a weekly bucket
    pub week_start: Weekday,
    pub top_n_keywords: usize,
    pub min_text_len: usize,
    pub deduplicate_by_id: bool,
    /// Reserved; nothing in the pipeline is stochastic
    pub seed: u64,
    pub columns: ColumnNames,
    pub normalization: NormalizeOptions,
    pub thresholds: Thresholds,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("Reviews.csv"),
            output_dir: PathBuf::from("outputs"),
            report_file_name: "sentiment_report.csv".to_string(),
            time_format: TimeFormat::Epoch,
            date_grain: DateGrain::Weekly,
            week_start: Weekday::Sun,
            top_n_keywords: DEFAULT_TOP_N_KEYWORDS,
            min_text_len: DEFAULT_MIN_TEXT_LEN,
            deduplicate_by_id: true,
            seed: 42,
            columns: ColumnNames::default(),
            normalization: NormalizeOptions::default(),
            thresholds: Thresholds::default(),
        }
    }
}

impl ReportConfig {
    /// Parse a configuration from TOML; absent keys keep their defaults
    pub fn from_toml_str(source: &str) -> Result<Self, ReportError> {
        let config: ReportConfig = toml::from_str(source)
            .map_err(|e| ReportError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML configuration file
    pub fn from_toml_file(path: &Path) -> Result<Self, ReportError> {
        let source = fs::read_to_string(path).map_err(|e| {
            ReportError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&source)
    }

    /// Render the configuration as TOML
    pub fn to_toml_string(&self) -> Result<String, ReportError> {
        toml::to_string_pretty(self).map_err(|e| ReportError::EncodingError(e.to_string()))
    }

    /// Check the configuration before any I/O takes place
    pub fn validate(&self) -> Result<(), ReportError> {
        Thresholds::new(self.thresholds.positive, self.thresholds.negative)?;

        if self.top_n_keywords == 0 {
            return Err(ReportError::Configuration(
                "top_n_keywords must be greater than zero".to_string(),
            ));
        }
        if self.columns.text.trim().is_empty() || self.columns.time.trim().is_empty() {
            return Err(ReportError::Configuration(
                "text and time column names must not be empty".to_string(),
            ));
        }
        if self.report_file_name.trim().is_empty() {
            return Err(ReportError::Configuration(
                "report_file_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Full path of the report CSV
    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(&self.report_file_name)
    }
}
