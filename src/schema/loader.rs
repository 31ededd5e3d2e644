//! Loader and validator
//!
//! Reads a source file through the matching adapter, checks that the text and
//! time columns exist, deduplicates by identifier and parses timestamps.
//! Rows whose time value does not parse are dropped and counted.

use crate::adapters::InputFormat;
use crate::config::{ColumnNames, ReportConfig, TimeFormat};
use crate::error::ReportError;
use crate::schema::raw_record::{CellValue, RawRecord, RawTable};
use crate::types::ValidatedRecord;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Largest epoch magnitude, in seconds, accepted before the whole column is
/// read as milliseconds (the nanosecond-precision range 1677-09-21..2262-04-11)
pub const EPOCH_SECONDS_LIMIT: f64 = 9_223_372_036.0;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const OFFSET_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f %z"];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%Y%m%d",
];

/// Statistics produced while loading
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    pub rows_read: usize,
    pub duplicates_removed: usize,
    pub unparseable_timestamps: usize,
}

/// Output of the loader
#[derive(Debug, Clone)]
pub struct LoadedRecords {
    /// Source columns, in source order
    pub columns: Vec<String>,
    pub records: Vec<ValidatedRecord>,
    pub stats: LoadStats,
}

/// How an epoch column was interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EpochUnit {
    Seconds,
    Milliseconds,
}

/// Loader for raw review records
#[derive(Debug, Clone)]
pub struct RecordLoader {
    columns: ColumnNames,
    time_format: TimeFormat,
    deduplicate_by_id: bool,
}

impl RecordLoader {
    pub fn new(columns: ColumnNames, time_format: TimeFormat, deduplicate_by_id: bool) -> Self {
        Self {
            columns,
            time_format,
            deduplicate_by_id,
        }
    }

    pub fn from_config(config: &ReportConfig) -> Self {
        Self::new(
            config.columns.clone(),
            config.time_format,
            config.deduplicate_by_id,
        )
    }

    /// Load and validate a source file
    pub fn load(&self, path: &Path) -> Result<LoadedRecords, ReportError> {
        if !path.exists() {
            return Err(ReportError::InputNotFound(path.to_path_buf()));
        }
        let format = InputFormat::from_path(path)?;
        let raw = fs::read_to_string(path)
            .map_err(|e| ReportError::ParseError(format!("{}: {}", path.display(), e)))?;

        debug!(path = %path.display(), ?format, "reading input");
        let table = format.adapter().parse(&raw)?;
        self.load_table(table)
    }

    /// Validate an already-parsed table
    pub fn load_table(&self, table: RawTable) -> Result<LoadedRecords, ReportError> {
        let text_index = table.column_index(&self.columns.text);
        let time_index = table.column_index(&self.columns.time);

        let (text_index, time_index) = match (text_index, time_index) {
            (Some(text), Some(time)) => (text, time),
            _ => {
                let missing: Vec<&str> = [self.columns.text.as_str(), self.columns.time.as_str()]
                    .into_iter()
                    .filter(|name| table.column_index(name).is_none())
                    .collect();
                return Err(ReportError::schema(missing, table.columns.iter().cloned()));
            }
        };
        let id_index = table.column_index(&self.columns.id);
        let summary_index = table.column_index(&self.columns.summary);

        let mut stats = LoadStats {
            rows_read: table.len(),
            ..Default::default()
        };

        // Text-like fields come from the source text, not the inferred cell
        let source_text = |values: &[CellValue], fields: &[String], i: usize| {
            (!values[i].is_null()).then(|| fields[i].clone())
        };

        let mut raw_records: Vec<RawRecord> = table
            .rows
            .into_iter()
            .zip(table.fields)
            .enumerate()
            .map(|(row, (values, fields))| {
                let time = match self.time_format {
                    TimeFormat::Epoch => values[time_index].clone(),
                    TimeFormat::Text => source_text(&values, &fields, time_index)
                        .map_or(CellValue::Null, CellValue::Text),
                };
                RawRecord {
                    row,
                    id: id_index.map(|i| values[i].clone()),
                    text: source_text(&values, &fields, text_index),
                    time,
                    summary: summary_index.and_then(|i| source_text(&values, &fields, i)),
                    fields,
                }
            })
            .collect();

        if self.deduplicate_by_id && id_index.is_some() {
            let before = raw_records.len();
            raw_records = deduplicate(raw_records);
            stats.duplicates_removed = before - raw_records.len();
            if stats.duplicates_removed > 0 {
                info!(
                    "Deduplicated by {}: {} -> {}",
                    self.columns.id,
                    before,
                    raw_records.len()
                );
            }
        }

        let parsed = self.parse_times(&raw_records);
        let mut records = Vec::with_capacity(raw_records.len());
        for (raw, timestamp) in raw_records.into_iter().zip(parsed) {
            match timestamp {
                Some(timestamp) => records.push(ValidatedRecord { raw, timestamp }),
                None => stats.unparseable_timestamps += 1,
            }
        }
        if stats.unparseable_timestamps > 0 {
            warn!(
                "{} rows had unparseable timestamps and were dropped",
                stats.unparseable_timestamps
            );
        }

        Ok(LoadedRecords {
            columns: table.columns,
            records,
            stats,
        })
    }

    fn parse_times(&self, records: &[RawRecord]) -> Vec<Option<DateTime<Utc>>> {
        match self.time_format {
            TimeFormat::Epoch => {
                let unit = epoch_unit(records.iter().map(|r| &r.time));
                if unit == EpochUnit::Milliseconds {
                    info!("epoch values exceed the seconds range, reading column as milliseconds");
                }
                records
                    .iter()
                    .map(|r| parse_epoch(&r.time, unit))
                    .collect()
            }
            TimeFormat::Text => records
                .iter()
                .map(|r| r.time.as_text().and_then(parse_datetime_text))
                .collect(),
        }
    }
}

/// Keep the first record for each identifier, in source order
fn deduplicate(records: Vec<RawRecord>) -> Vec<RawRecord> {
    let mut seen: HashSet<CellValue> = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|record| match &record.id {
            Some(id) => seen.insert(id.clone()),
            None => true,
        })
        .collect()
}

/// Seconds unless any value falls outside the representable seconds range
fn epoch_unit<'a>(values: impl Iterator<Item = &'a CellValue>) -> EpochUnit {
    let out_of_range = values
        .filter_map(CellValue::as_f64)
        .any(|v| v.abs() > EPOCH_SECONDS_LIMIT);
    if out_of_range {
        EpochUnit::Milliseconds
    } else {
        EpochUnit::Seconds
    }
}

fn parse_epoch(value: &CellValue, unit: EpochUnit) -> Option<DateTime<Utc>> {
    let seconds = match (value, unit) {
        (CellValue::Int(i), EpochUnit::Seconds) => return DateTime::from_timestamp(*i, 0),
        (CellValue::Int(i), EpochUnit::Milliseconds) => {
            if (*i as f64).abs() > EPOCH_SECONDS_LIMIT * 1000.0 {
                return None;
            }
            return DateTime::from_timestamp_millis(*i);
        }
        (other, EpochUnit::Seconds) => other.as_f64()?,
        (other, EpochUnit::Milliseconds) => other.as_f64()? / 1000.0,
    };

    if seconds.abs() > EPOCH_SECONDS_LIMIT {
        return None;
    }
    let whole = seconds.floor();
    let nanos = (((seconds - whole) * 1e9).round() as u32).min(999_999_999);
    DateTime::from_timestamp(whole as i64, nanos)
}

/// Parse free-form date/time text; naive values are taken as UTC
pub fn parse_datetime_text(text: &str) -> Option<DateTime<Utc>> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|naive| Utc.from_utc_datetime(&naive));
        }
    }
    None
}
