//! Pipeline orchestration
//!
//! This module provides the public API for sentiflux.
//! It orchestrates the full run from a tabular review file to report artifacts.
//!
//! Stages:
//! 1. RecordLoader - Parse, deduplicate and timestamp raw rows
//! 2. TextNormalizer - Clean review text
//! 3. SentimentScorer - Score polarity
//! 4. Thresholds - Label each record
//! 5. Aggregator - Distribution, trend and keyword views
//! 6. ReportSink - Persist the report and charts

use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::aggregator::{Aggregator, TokenFilter};
use crate::classifier::Thresholds;
use crate::config::ReportConfig;
use crate::error::ReportError;
use crate::normalizer::TextNormalizer;
use crate::schema::{LoadedRecords, RecordLoader};
use crate::scoring::{LexiconScorer, SentimentScorer};
use crate::sink::{FileReportSink, ReportArtifacts, ReportSink};
use crate::types::{
    AggregateReport, ClassifiedRecord, NormalizedRecord, RunStats, ValidatedRecord,
};

/// Records that survived the per-record stages
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    /// Classified records, in input order
    pub records: Vec<ClassifiedRecord>,
    pub short_texts_dropped: usize,
}

/// Per-record stages: normalize, filter by length, score, classify.
///
/// Every stage is a pure function of one record, so records are mapped in
/// parallel and collected back in input order.
pub struct SentimentPipeline<S = LexiconScorer> {
    normalizer: TextNormalizer,
    scorer: S,
    thresholds: Thresholds,
    min_text_len: usize,
}

impl<S: SentimentScorer> SentimentPipeline<S> {
    pub fn new(
        normalizer: TextNormalizer,
        scorer: S,
        thresholds: Thresholds,
        min_text_len: usize,
    ) -> Self {
        Self {
            normalizer,
            scorer,
            thresholds,
            min_text_len,
        }
    }

    pub fn from_config(config: &ReportConfig, scorer: S) -> Self {
        Self::new(
            TextNormalizer::new(config.normalization),
            scorer,
            config.thresholds,
            config.min_text_len,
        )
    }

    pub fn normalize_record(&self, record: ValidatedRecord) -> NormalizedRecord {
        let clean_text = self.normalizer.normalize(record.raw.text.as_deref());
        NormalizedRecord {
            validated: record,
            clean_text,
        }
    }

    pub fn classify_record(&self, record: NormalizedRecord) -> ClassifiedRecord {
        let score = self.scorer.score(&record.clean_text);
        let label = self.thresholds.classify(score.compound);
        ClassifiedRecord {
            normalized: record,
            score,
            label,
        }
    }

    /// Run the per-record stages over a validated set
    pub fn run(&self, records: Vec<ValidatedRecord>) -> PipelineOutput {
        let total = records.len();

        let mapped: Vec<Option<ClassifiedRecord>> = records
            .into_par_iter()
            .map(|record| {
                let normalized = self.normalize_record(record);
                if normalized.clean_text.chars().count() < self.min_text_len {
                    None
                } else {
                    Some(self.classify_record(normalized))
                }
            })
            .collect();

        let records: Vec<ClassifiedRecord> = mapped.into_iter().flatten().collect();
        let short_texts_dropped = total - records.len();

        if short_texts_dropped > 0 {
            warn!(
                dropped = short_texts_dropped,
                min_text_len = self.min_text_len,
                "dropped records with short normalized text"
            );
        }
        if records.is_empty() {
            warn!("no records left to classify");
        }
        info!(classified = records.len(), "classified records");

        PipelineOutput {
            records,
            short_texts_dropped,
        }
    }
}

/// Classify a validated set with the default scorer.
///
/// # Example
/// ```ignore
/// let loaded = RecordLoader::from_config(&config).load(&config.input_path)?;
/// let output = classify_records(loaded.records, &config);
/// ```
pub fn classify_records(records: Vec<ValidatedRecord>, config: &ReportConfig) -> PipelineOutput {
    SentimentPipeline::from_config(config, LexiconScorer::new()).run(records)
}

/// Everything a run produced, handed to a [`ReportSink`]
#[derive(Debug, Clone)]
pub struct ReportRun {
    pub run_id: Uuid,
    /// Source columns, in source order
    pub columns: Vec<String>,
    pub records: Vec<ClassifiedRecord>,
    pub report: AggregateReport,
    pub stats: RunStats,
}

/// Result of a persisted run
#[derive(Debug, Clone, Serialize)]
pub struct ReportOutcome {
    pub run_id: Uuid,
    pub stats: RunStats,
    pub artifacts: ReportArtifacts,
}

/// Configured processor for full report runs.
///
/// Use this to swap the scoring backend or keyword filter.
pub struct ReportProcessor<S = LexiconScorer> {
    config: ReportConfig,
    loader: RecordLoader,
    pipeline: SentimentPipeline<S>,
    aggregator: Aggregator,
}

impl ReportProcessor<LexiconScorer> {
    /// Create a processor with the bundled lexicon scorer
    pub fn new(config: ReportConfig) -> Result<Self, ReportError> {
        Self::with_scorer(config, LexiconScorer::new())
    }
}

impl<S: SentimentScorer> ReportProcessor<S> {
    /// Create a processor with a custom scoring backend
    pub fn with_scorer(config: ReportConfig, scorer: S) -> Result<Self, ReportError> {
        config.validate()?;
        Ok(Self {
            loader: RecordLoader::from_config(&config),
            pipeline: SentimentPipeline::from_config(&config, scorer),
            aggregator: Aggregator::from_config(&config),
            config,
        })
    }

    pub fn with_token_filter(mut self, filter: Box<dyn TokenFilter>) -> Self {
        self.aggregator = self.aggregator.with_token_filter(filter);
        self
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Classify and aggregate an already-loaded set
    pub fn analyze(&self, loaded: LoadedRecords) -> ReportRun {
        let output = self.pipeline.run(loaded.records);
        let report = self.aggregator.compute(&output.records);

        let stats = RunStats {
            rows_read: loaded.stats.rows_read,
            duplicates_removed: loaded.stats.duplicates_removed,
            unparseable_timestamps: loaded.stats.unparseable_timestamps,
            short_texts_dropped: output.short_texts_dropped,
            classified: output.records.len(),
        };

        ReportRun {
            run_id: Uuid::new_v4(),
            columns: loaded.columns,
            records: output.records,
            report,
            stats,
        }
    }

    /// Load the configured input, classify and aggregate it
    pub fn process(&self) -> Result<ReportRun, ReportError> {
        let loaded = self.loader.load(&self.config.input_path)?;
        info!(
            rows = loaded.stats.rows_read,
            valid = loaded.records.len(),
            "loaded input"
        );
        Ok(self.analyze(loaded))
    }

    /// Full run, persisted through `sink`
    pub fn run(&self, sink: &dyn ReportSink) -> Result<ReportOutcome, ReportError> {
        let started = Instant::now();
        let run = self.process()?;
        let artifacts = sink.write(&run)?;

        info!(
            run_id = %run.run_id,
            rows_read = run.stats.rows_read,
            duplicates_removed = run.stats.duplicates_removed,
            unparseable_timestamps = run.stats.unparseable_timestamps,
            short_texts_dropped = run.stats.short_texts_dropped,
            classified = run.stats.classified,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "run complete"
        );

        Ok(ReportOutcome {
            run_id: run.run_id,
            stats: run.stats,
            artifacts,
        })
    }
}

/// Run the whole report for a configuration, writing files under its output
/// directory.
///
/// Configuration is validated before any input is read.
pub fn run_report(config: &ReportConfig) -> Result<ReportOutcome, ReportError> {
    let processor = ReportProcessor::new(config.clone())?;
    let sink = FileReportSink::from_config(config);
    processor.run(&sink)
}
