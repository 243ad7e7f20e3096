//! Row classification.
//!
//! A single classifier decides what every raw row is. The normalizer uses it to
//! filter rows, and the diagnostic views use it to explain those decisions.

use crate::layout::ColumnLayout;
use crate::model::RawRow;
use serde::Serialize;
use std::fmt;

/// Date or description text that ends the data region.
pub const TERMINATOR_LABEL: &str = "Total";

/// Date text of an embedded header row.
pub const HEADER_LABEL: &str = "Date";

/// Description texts of summary rows.
pub const SUMMARY_LABELS: [&str; 2] = ["TOTAL", "Per Person"];

/// What a raw row represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    /// Date and description are both missing
    Empty,
    /// End of the data region; nothing after it is read
    Terminator,
    /// A repeated column-label row
    Header,
    /// A totals or per-person summary row
    Summary,
    /// An expense row
    Data,
}

impl RowKind {
    /// Check if rows of this kind produce a record.
    pub fn is_data(&self) -> bool {
        matches!(self, RowKind::Data)
    }

    /// Short lowercase label.
    pub fn label(&self) -> &'static str {
        match self {
            RowKind::Empty => "empty",
            RowKind::Terminator => "terminator",
            RowKind::Header => "header",
            RowKind::Summary => "summary",
            RowKind::Data => "data",
        }
    }
}

impl fmt::Display for RowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a row. The first matching rule wins:
/// empty, terminator, header, summary, then data.
pub fn classify(row: &RawRow, layout: &ColumnLayout) -> RowKind {
    let date = row.cell(layout.date);
    let description = row.cell(layout.description);

    if date.is_empty() && description.is_empty() {
        return RowKind::Empty;
    }

    let date_text = date.text();
    let description_text = description.text();

    if date_text.as_deref() == Some(TERMINATOR_LABEL)
        || description_text.as_deref() == Some(TERMINATOR_LABEL)
    {
        return RowKind::Terminator;
    }

    if date_text.as_deref() == Some(HEADER_LABEL) {
        return RowKind::Header;
    }

    if description_text
        .as_deref()
        .is_some_and(|text| SUMMARY_LABELS.contains(&text))
    {
        return RowKind::Summary;
    }

    RowKind::Data
}
