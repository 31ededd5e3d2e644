//! Core types for the Sentiflux pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: validated records, normalized records, classified records, and the
//! aggregate views derived from them.

use crate::error::ReportError;
use crate::schema::RawRecord;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Categorical sentiment outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Negative,
    Neutral,
    Positive,
}

impl SentimentLabel {
    /// Reporting order used by every view: positive, neutral, negative
    pub const REPORT_ORDER: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Neutral,
        SentimentLabel::Negative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Negative => "negative",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Polarity scores produced by a [`SentimentScorer`](crate::scoring::SentimentScorer)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    /// Overall polarity in [-1, 1]
    pub compound: f64,
    /// Positive proportion in [0, 1]
    pub pos: f64,
    /// Neutral proportion in [0, 1]
    pub neu: f64,
    /// Negative proportion in [0, 1]
    pub neg: f64,
}

impl SentimentScore {
    /// Score of a text with no sentiment-bearing content
    pub fn neutral() -> Self {
        Self {
            compound: 0.0,
            pos: 0.0,
            neu: 1.0,
            neg: 0.0,
        }
    }
}

/// Time bucket grain for the trend view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateGrain {
    #[serde(rename = "D", alias = "daily")]
    Daily,
    #[serde(rename = "W", alias = "weekly")]
    Weekly,
    #[serde(rename = "M", alias = "monthly")]
    Monthly,
}

impl DateGrain {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateGrain::Daily => "D",
            DateGrain::Weekly => "W",
            DateGrain::Monthly => "M",
        }
    }
}

impl FromStr for DateGrain {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "D" | "d" | "daily" => Ok(DateGrain::Daily),
            "W" | "w" | "weekly" => Ok(DateGrain::Weekly),
            "M" | "m" | "monthly" => Ok(DateGrain::Monthly),
            other => Err(ReportError::Configuration(format!(
                "invalid date grain '{other}', expected one of D, W, M"
            ))),
        }
    }
}

impl fmt::Display for DateGrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw record whose time value parsed to a valid point in time
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRecord {
    pub raw: RawRecord,
    /// Parsed timestamp (UTC)
    pub timestamp: DateTime<Utc>,
}

/// A validated record with its cleaned text
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub validated: ValidatedRecord,
    /// Output of the text normalizer; a pure function of the raw text and options
    pub clean_text: String,
}

/// A normalized record with its polarity scores and label
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRecord {
    pub normalized: NormalizedRecord,
    pub score: SentimentScore,
    pub label: SentimentLabel,
}

impl ClassifiedRecord {
    pub fn raw(&self) -> &RawRecord {
        &self.normalized.validated.raw
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.normalized.validated.timestamp
    }

    pub fn clean_text(&self) -> &str {
        &self.normalized.clean_text
    }

    pub fn compound(&self) -> f64 {
        self.score.compound
    }
}

/// Record count per label; every label is always present
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelDistribution {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl LabelDistribution {
    pub fn count(&self, label: SentimentLabel) -> usize {
        match label {
            SentimentLabel::Positive => self.positive,
            SentimentLabel::Neutral => self.neutral,
            SentimentLabel::Negative => self.negative,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Counts in reporting order: positive, neutral, negative
    pub fn entries(&self) -> [(SentimentLabel, usize); 3] {
        SentimentLabel::REPORT_ORDER.map(|label| (label, self.count(label)))
    }

    /// Share of each label in reporting order; all zero for an empty set
    pub fn proportions(&self) -> [(SentimentLabel, f64); 3] {
        let total = self.total();
        SentimentLabel::REPORT_ORDER.map(|label| {
            let share = if total == 0 {
                0.0
            } else {
                self.count(label) as f64 / total as f64
            };
            (label, share)
        })
    }
}

/// Mean compound score of one non-empty time bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// First day of the bucket
    pub bucket_start: NaiveDate,
    pub mean_compound: f64,
    /// Number of records in the bucket
    pub count: usize,
}

/// Keyword with its occurrence count across all records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCount {
    pub term: String,
    pub count: usize,
}

/// Aggregate views recomputed from the classified set on every run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateReport {
    pub distribution: LabelDistribution,
    pub grain: DateGrain,
    /// Ascending by bucket start; empty buckets omitted
    pub trend: Vec<TrendPoint>,
    /// Descending by count, at most N entries
    pub keywords: Vec<KeywordCount>,
}

/// Counts reported for a run; skipped rows are statistics, not errors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Rows read from the source
    pub rows_read: usize,
    /// Rows removed by identifier deduplication
    pub duplicates_removed: usize,
    /// Rows dropped because the time value did not parse
    pub unparseable_timestamps: usize,
    /// Rows dropped because the normalized text was below the minimum length
    pub short_texts_dropped: usize,
    /// Rows that reached the classified set
    pub classified: usize,
}
