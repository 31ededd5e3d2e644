//! Raw tabular input
//!
//! A [`RawTable`] is what an input adapter produces: the source's column
//! names plus, per record, one row of typed [`CellValue`]s and the source text
//! of the same cells. The loader turns rows into [`RawRecord`]s that keep the
//! source text of every cell for the output report.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single scalar cell read from the source
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    /// Infer a typed cell from CSV text: empty is null, then integer, float,
    /// boolean, and finally text.
    pub fn infer(field: &str) -> Self {
        let trimmed = field.trim();
        if trimmed.is_empty() {
            return CellValue::Null;
        }
        if let Ok(value) = trimmed.parse::<i64>() {
            return CellValue::Int(value);
        }
        if let Ok(value) = trimmed.parse::<f64>() {
            if value.is_finite() {
                return CellValue::Float(value);
            }
        }
        match trimmed {
            "true" | "True" | "TRUE" => CellValue::Bool(true),
            "false" | "False" | "FALSE" => CellValue::Bool(false),
            _ => CellValue::Text(field.to_string()),
        }
    }

    /// Map a JSON value to a cell; nested arrays and objects keep their JSON text
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CellValue::Null,
            serde_json::Value::Bool(b) => CellValue::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => CellValue::Int(i),
                None => n.as_f64().map_or(CellValue::Null, CellValue::Float),
            },
            serde_json::Value::String(s) => CellValue::Text(s.clone()),
            other => CellValue::Text(other.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Numeric view of the cell, parsing numeric text
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Float(f) => Some(*f),
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

// Identifier equality is exact: 1 and 1.0 are different ids, and null equals
// null so that repeated missing ids collapse like any other value.
impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CellValue::Null, CellValue::Null) => true,
            (CellValue::Bool(a), CellValue::Bool(b)) => a == b,
            (CellValue::Int(a), CellValue::Int(b)) => a == b,
            (CellValue::Float(a), CellValue::Float(b)) => a.to_bits() == b.to_bits(),
            (CellValue::Text(a), CellValue::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for CellValue {}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Null => {}
            CellValue::Bool(b) => b.hash(state),
            CellValue::Int(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Text(s) => s.hash(state),
        }
    }
}

/// Column names and rows as read from the source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    /// Each row has exactly `columns.len()` cells
    pub rows: Vec<Vec<CellValue>>,
    /// Source text of every cell, aligned with `rows`
    pub fields: Vec<Vec<String>>,
}

impl RawTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One input row with its well-known fields picked out
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// Zero-based position in the source
    pub row: usize,
    /// Identifier, when the source has an identifier column
    pub id: Option<CellValue>,
    /// Review text as written in the source; `None` when the cell is null
    pub text: Option<String>,
    /// Unparsed time value
    pub time: CellValue,
    pub summary: Option<String>,
    /// Source text of every cell, aligned with the source columns
    pub fields: Vec<String>,
}
