//! Untyped cell values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single spreadsheet cell value as read from the source table.
///
/// `Empty` is the missing-value marker. It is distinct from `Number(0.0)` and
/// from `Text("")`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum CellValue {
    /// No value in this position
    #[default]
    Empty,
    /// Numeric value
    Number(f64),
    /// Text value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Date or date-time, already rendered as ISO 8601
    DateTime(String),
    /// Spreadsheet error code such as `#N/A`
    Error(String),
}

impl CellValue {
    /// Check if this is the missing-value marker.
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Display text of the cell, or `None` when the cell is missing.
    pub fn text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            other => Some(other.to_string()),
        }
    }

    /// Display text of the cell, with missing cells rendered as the empty string.
    pub fn text_or_empty(&self) -> String {
        self.text().unwrap_or_default()
    }

    /// Interpret the cell as a finite decimal number.
    ///
    /// Numeric text is parsed after trimming surrounding whitespace. Booleans
    /// count as 1 and 0. Dates, error codes, missing cells, NaN and infinities
    /// yield `None`.
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            CellValue::Number(n) => *n,
            CellValue::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            CellValue::Text(s) => s.trim().parse::<f64>().ok()?,
            CellValue::Empty | CellValue::DateTime(_) | CellValue::Error(_) => return None,
        };

        value.is_finite().then_some(value)
    }

    /// Numeric coercion with the 0.0 fallback.
    pub fn coerce_number(&self) -> f64 {
        self.as_number().unwrap_or(0.0)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Bool(true) => f.write_str("TRUE"),
            CellValue::Bool(false) => f.write_str("FALSE"),
            CellValue::DateTime(s) => f.write_str(s),
            CellValue::Error(code) => f.write_str(code),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Empty)
    }
}
