//! CSV adapter

use super::TableAdapter;
use crate::error::ReportError;
use crate::schema::{CellValue, RawTable};

/// Adapter for comma-separated input with a header row
pub struct CsvAdapter;

impl TableAdapter for CsvAdapter {
    fn parse(&self, raw: &str) -> Result<RawTable, ReportError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(raw.as_bytes());

        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| ReportError::ParseError(format!("CSV header: {e}")))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        let mut fields = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record.map_err(|e| {
                ReportError::ParseError(format!("CSV row {}: {}", index + 1, e))
            })?;
            rows.push(record.iter().map(CellValue::infer).collect());
            fields.push(record.iter().map(str::to_string).collect());
        }

        Ok(RawTable {
            columns,
            rows,
            fields,
        })
    }
}
