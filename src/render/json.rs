//! JSON renderer implementation.

use crate::error::Result;
use crate::model::ExpenseRecord;

/// JSON output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JsonFormat {
    /// Compact single-line JSON
    Compact,
    /// Pretty-printed with 2-space indentation
    #[default]
    Pretty,
}

/// Render records as a JSON array.
///
/// Record keys keep declaration order and share keys keep column order.
pub fn to_json(records: &[ExpenseRecord], format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Compact => serde_json::to_string(records)?,
        JsonFormat::Pretty => serde_json::to_string_pretty(records)?,
    };
    Ok(json)
}

/// Render records as pretty-printed JSON.
pub fn to_json_default(records: &[ExpenseRecord]) -> Result<String> {
    to_json(records, JsonFormat::Pretty)
}
