//! Diagnostic views of a raw table.
//!
//! Nothing here filters rows for the normalizer. These helpers exist so a person
//! can check where a sheet's data starts before trusting the extracted records.

use crate::classify::{classify, RowKind};
use crate::layout::ColumnLayout;
use crate::model::RawRow;
use serde::Serialize;

/// Substrings that mark a probable header row.
pub const HEADER_KEYWORDS: [&str; 2] = ["Date", "Description"];

/// Rows must have more than this many filled cells to be listed by [`dense_rows`] by default.
pub const DEFAULT_MIN_FILLED: usize = 3;

/// Default index after which [`dense_rows`] stops listing.
pub const DEFAULT_LAST_INDEX: usize = 15;

/// Check whether a row mentions any header keyword.
///
/// The keywords are matched case-sensitively as substrings, both against the
/// rendering of the whole row and against every cell's text.
pub fn mentions_header_keyword(row: &RawRow) -> bool {
    let rendered = row.to_string();
    if HEADER_KEYWORDS.iter().any(|k| rendered.contains(k)) {
        return true;
    }

    row.cells()
        .iter()
        .filter_map(|cell| cell.text())
        .any(|text| HEADER_KEYWORDS.iter().any(|k| text.contains(k)))
}

/// Find the first row that looks like a header.
///
/// Returns `None` when no row mentions a header keyword.
pub fn locate(rows: &[RawRow]) -> Option<usize> {
    let found = rows.iter().position(mentions_header_keyword);
    tracing::debug!(header_row = ?found, "header scan finished");
    found
}

/// List rows with more than `min_filled` present cells.
///
/// Listing stops right after the first listed row whose index is past
/// `last_index`.
pub fn dense_rows(rows: &[RawRow], min_filled: usize, last_index: usize) -> Vec<(usize, &RawRow)> {
    let mut listed = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        if row.filled_count() > min_filled {
            listed.push((index, row));
            if index > last_index {
                break;
            }
        }
    }
    listed
}

/// One line of a classification report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowSummary {
    /// Position of the row
    pub index: usize,
    /// How the normalizer treats it
    pub kind: RowKind,
    /// Whether the row mentions a header keyword
    pub keyword_match: bool,
    /// Number of present cells
    pub filled: usize,
}

/// Classify every row, including rows the normalizer would never reach.
pub fn summarize(rows: &[RawRow], layout: &ColumnLayout) -> Vec<RowSummary> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| RowSummary {
            index,
            kind: classify(row, layout),
            keyword_match: mentions_header_keyword(row),
            filled: row.filled_count(),
        })
        .collect()
}
