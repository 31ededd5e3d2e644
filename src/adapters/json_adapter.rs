//! JSON adapters
//!
//! Both adapters build the column set as the union of object keys in order of
//! first appearance; a key missing from an object reads as null.

use super::TableAdapter;
use crate::error::ReportError;
use crate::schema::{CellValue, RawTable};
use serde_json::{Map, Value};

/// Adapter for a JSON array of objects
pub struct JsonArrayAdapter;

/// Adapter for newline-delimited JSON (one object per line)
pub struct JsonLinesAdapter;

impl TableAdapter for JsonArrayAdapter {
    fn parse(&self, raw: &str) -> Result<RawTable, ReportError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| ReportError::ParseError(format!("JSON: {e}")))?;

        let items = match value {
            Value::Array(items) => items,
            _ => {
                return Err(ReportError::ParseError(
                    "JSON input must be an array of objects".to_string(),
                ))
            }
        };

        let mut objects = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            match item {
                Value::Object(map) => objects.push(map),
                _ => {
                    return Err(ReportError::ParseError(format!(
                        "JSON element {} is not an object",
                        index
                    )))
                }
            }
        }

        Ok(objects_to_table(&objects))
    }
}

impl TableAdapter for JsonLinesAdapter {
    fn parse(&self, raw: &str) -> Result<RawTable, ReportError> {
        let mut objects = Vec::new();
        for (line_num, line) in raw.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<Value>(trimmed) {
                Ok(Value::Object(map)) => objects.push(map),
                Ok(_) => {
                    return Err(ReportError::ParseError(format!(
                        "Line {} is not a JSON object",
                        line_num + 1
                    )));
                }
                Err(e) => {
                    return Err(ReportError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }

        Ok(objects_to_table(&objects))
    }
}

fn objects_to_table(objects: &[Map<String, Value>]) -> RawTable {
    let mut columns: Vec<String> = Vec::new();
    for object in objects {
        for key in object.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }

    let rows = objects
        .iter()
        .map(|object| {
            columns
                .iter()
                .map(|column| object.get(column).map_or(CellValue::Null, CellValue::from_json))
                .collect()
        })
        .collect();

    let fields = objects
        .iter()
        .map(|object| {
            columns
                .iter()
                .map(|column| object.get(column).map(field_text).unwrap_or_default())
                .collect()
        })
        .collect();

    RawTable {
        columns,
        rows,
        fields,
    }
}

/// Source text of a JSON value: strings unquoted, null empty, anything else
/// as written in JSON
fn field_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_json_array() {
        let raw = r#"[
            {"Id": 1, "Text": "Lovely tea", "Time": 1300000000},
            {"Id": 2, "Time": 1300000500, "Summary": "meh"}
        ]"#;
        let table = JsonArrayAdapter.parse(raw).unwrap();

        assert_eq!(table.columns, vec!["Id", "Text", "Time", "Summary"]);
        assert_eq!(table.rows[1][1], CellValue::Null);
        assert_eq!(table.rows[1][3], CellValue::Text("meh".to_string()));
        assert_eq!(table.rows[0][3], CellValue::Null);
        assert_eq!(table.fields[0], vec!["1", "Lovely tea", "1300000000", ""]);
    }

    #[test]
    fn test_fields_keep_json_number_text() {
        let raw = r#"[{"Id": 2.0, "Text": "ok", "Time": 20230101, "Tags": ["a"]}]"#;
        let table = JsonArrayAdapter.parse(raw).unwrap();

        assert_eq!(table.rows[0][0], CellValue::Float(2.0));
        assert_eq!(table.fields[0], vec!["2.0", "ok", "20230101", "[\"a\"]"]);
    }

    #[test]
    fn test_json_array_rejects_non_array() {
        let result = JsonArrayAdapter.parse(r#"{"Id": 1}"#);
        assert!(matches!(result, Err(ReportError::ParseError(_))));
    }

    #[test]
    fn test_parse_json_lines_skips_blank_lines() {
        let raw = "{\"Text\": \"a\", \"Time\": 1}\n\n{\"Text\": \"b\", \"Time\": 2}\n";
        let table = JsonLinesAdapter.parse(raw).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.columns, vec!["Text", "Time"]);
    }

    #[test]
    fn test_json_lines_reports_line_number() {
        let raw = "{\"Text\": \"a\"}\nnot json\n";
        let err = JsonLinesAdapter.parse(raw).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
