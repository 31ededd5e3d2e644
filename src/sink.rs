//! Report sinks
//!
//! A [`ReportSink`] persists a finished run. [`FileReportSink`] writes the
//! per-record report as CSV, one Vega-Lite spec per aggregate view and a
//! JSON run summary into an output directory.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::ReportConfig;
use crate::encoder::ChartEncoder;
use crate::error::ReportError;
use crate::pipeline::ReportRun;
use crate::types::{AggregateReport, RunStats};
use crate::{PRODUCER_NAME, SENTIFLUX_VERSION};

/// Derived columns appended to every report row
pub const COMPOUND_COLUMN: &str = "compound score";
pub const LABEL_COLUMN: &str = "label";

/// File name of the run summary
pub const SUMMARY_FILE_NAME: &str = "run_summary.json";

/// Paths written by a sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportArtifacts {
    pub report: PathBuf,
    pub charts: Vec<PathBuf>,
    pub summary: PathBuf,
}

/// Destination for a finished run
pub trait ReportSink {
    fn write(&self, run: &ReportRun) -> Result<ReportArtifacts, ReportError>;
}

#[derive(Serialize)]
struct ProducerInfo<'a> {
    name: &'a str,
    version: &'a str,
}

#[derive(Serialize)]
struct RunSummary<'a> {
    run_id: Uuid,
    producer: ProducerInfo<'a>,
    generated_at: String,
    stats: &'a RunStats,
    report: &'a AggregateReport,
    artifacts: &'a ReportArtifacts,
}

/// Writes report artifacts into a directory
#[derive(Debug, Clone)]
pub struct FileReportSink {
    output_dir: PathBuf,
    report_file_name: String,
}

impl FileReportSink {
    pub fn new(output_dir: impl Into<PathBuf>, report_file_name: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            report_file_name: report_file_name.into(),
        }
    }

    pub fn from_config(config: &ReportConfig) -> Self {
        Self::new(&config.output_dir, &config.report_file_name)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn write_report_csv(&self, run: &ReportRun, path: &Path) -> Result<(), ReportError> {
        let mut writer = csv::Writer::from_path(path)?;

        let mut header: Vec<&str> = run.columns.iter().map(String::as_str).collect();
        header.push(COMPOUND_COLUMN);
        header.push(LABEL_COLUMN);
        writer.write_record(&header)?;

        for record in &run.records {
            let mut row: Vec<String> = record.raw().fields.clone();
            row.push(record.compound().to_string());
            row.push(record.label.to_string());
            writer.write_record(&row)?;
        }

        writer.flush()?;
        Ok(())
    }
}

impl ReportSink for FileReportSink {
    fn write(&self, run: &ReportRun) -> Result<ReportArtifacts, ReportError> {
        fs::create_dir_all(&self.output_dir)?;

        let report = self.output_dir.join(&self.report_file_name);
        self.write_report_csv(run, &report)?;
        debug!(path = %report.display(), rows = run.records.len(), "wrote report");

        let encoder = ChartEncoder::with_run_id(run.run_id);
        let mut charts = Vec::new();
        for chart in encoder.encode_all(&run.report) {
            let path = self.output_dir.join(chart.kind.file_name());
            let json = serde_json::to_string_pretty(&chart.spec)
                .map_err(|e| ReportError::EncodingError(e.to_string()))?;
            fs::write(&path, json)?;
            charts.push(path);
        }

        let artifacts = ReportArtifacts {
            report,
            charts,
            summary: self.output_dir.join(SUMMARY_FILE_NAME),
        };

        let summary = RunSummary {
            run_id: run.run_id,
            producer: ProducerInfo {
                name: PRODUCER_NAME,
                version: SENTIFLUX_VERSION,
            },
            generated_at: Utc::now().to_rfc3339(),
            stats: &run.stats,
            report: &run.report,
            artifacts: &artifacts,
        };
        let json = serde_json::to_string_pretty(&summary)
            .map_err(|e| ReportError::EncodingError(e.to_string()))?;
        fs::write(&artifacts.summary, json)?;

        info!(
            output_dir = %self.output_dir.display(),
            charts = artifacts.charts.len(),
            "wrote artifacts"
        );
        Ok(artifacts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CellValue, RawRecord};
    use crate::types::{
        ClassifiedRecord, DateGrain, LabelDistribution, NormalizedRecord, SentimentLabel,
        SentimentScore, ValidatedRecord,
    };
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn classified(fields: &[&str], compound: f64, label: SentimentLabel) -> ClassifiedRecord {
        ClassifiedRecord {
            normalized: NormalizedRecord {
                validated: ValidatedRecord {
                    raw: RawRecord {
                        row: 0,
                        id: Some(CellValue::infer(fields[0])),
                        text: Some(fields[1].to_string()),
                        time: CellValue::infer(fields[2]),
                        summary: None,
                        fields: fields.iter().map(|f| f.to_string()).collect(),
                    },
                    timestamp: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
                },
                clean_text: String::new(),
            },
            score: SentimentScore {
                compound,
                ..SentimentScore::neutral()
            },
            label,
        }
    }

    fn sample_run(records: Vec<ClassifiedRecord>) -> ReportRun {
        ReportRun {
            run_id: Uuid::new_v4(),
            columns: vec!["Id".into(), "Text".into(), "Time".into(), "Note".into()],
            records,
            report: AggregateReport {
                distribution: LabelDistribution {
                    positive: 1,
                    neutral: 0,
                    negative: 1,
                },
                grain: DateGrain::Weekly,
                trend: vec![],
                keywords: vec![],
            },
            stats: RunStats {
                rows_read: 2,
                classified: 2,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_report_csv_appends_derived_columns() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileReportSink::new(dir.path().join("out"), "report.csv");
        let run = sample_run(vec![
            classified(
                &["1", "Great, really great", "1672531200", ""],
                0.5,
                SentimentLabel::Positive,
            ),
            classified(
                &["2", "Bad", "1672531200", "1.5"],
                -0.25,
                SentimentLabel::Negative,
            ),
        ]);

        let artifacts = sink.write(&run).unwrap();
        let report = fs::read_to_string(&artifacts.report).unwrap();

        assert_eq!(
            report,
            "Id,Text,Time,Note,compound score,label\n\
             1,\"Great, really great\",1672531200,,0.5,positive\n\
             2,Bad,1672531200,1.5,-0.25,negative\n"
        );
    }

    #[test]
    fn test_report_keeps_source_text_of_cells() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileReportSink::new(dir.path(), "report.csv");
        let run = sample_run(vec![
            classified(&["007", "TRUE", "1672531200", "1.50"], 0.0, SentimentLabel::Neutral),
            classified(&["1.0", "ok tea", "1672531200", ""], 0.3, SentimentLabel::Positive),
        ]);

        let artifacts = sink.write(&run).unwrap();
        let report = fs::read_to_string(&artifacts.report).unwrap();

        assert_eq!(
            report,
            "Id,Text,Time,Note,compound score,label\n\
             007,TRUE,1672531200,1.50,0,neutral\n\
             1.0,ok tea,1672531200,,0.3,positive\n"
        );
    }

    #[test]
    fn test_report_is_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileReportSink::new(dir.path(), "report.csv");
        fs::write(dir.path().join("report.csv"), "stale content from a previous run\n").unwrap();

        let artifacts = sink.write(&sample_run(vec![])).unwrap();
        let report = fs::read_to_string(&artifacts.report).unwrap();
        assert_eq!(report, "Id,Text,Time,Note,compound score,label\n");
    }

    #[test]
    fn test_charts_and_summary_written() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileReportSink::new(dir.path(), "report.csv");
        let run = sample_run(vec![]);

        let artifacts = sink.write(&run).unwrap();

        let names: Vec<String> = artifacts
            .charts
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "sentiment_distribution.vl.json",
                "sentiment_pie.vl.json",
                "sentiment_trend.vl.json",
                "top_keywords.vl.json"
            ]
        );

        let trend: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&artifacts.charts[2]).unwrap()).unwrap();
        assert_eq!(trend["title"], "Average Sentiment Over Time (W) (no data)");
        assert_eq!(trend["usermeta"]["run_id"], run.run_id.to_string());

        let summary: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&artifacts.summary).unwrap()).unwrap();
        assert_eq!(summary["run_id"], run.run_id.to_string());
        assert_eq!(summary["producer"]["name"], "sentiflux");
        assert_eq!(summary["stats"]["rows_read"], 2);
        assert_eq!(summary["report"]["distribution"]["negative"], 1);
        assert_eq!(summary["report"]["grain"], "W");
        assert_eq!(summary["artifacts"]["charts"].as_array().unwrap().len(), 4);
    }
}
