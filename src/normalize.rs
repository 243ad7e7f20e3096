//! Row normalization.
//!
//! Walks raw rows in order and turns every data row into an [`ExpenseRecord`].
//! Non-data rows are skipped, and a terminator row ends the walk.
//!
//! # Example
//!
//! ```
//! use splitsheet::{CellValue, Normalizer, RawRow};
//!
//! let rows: Vec<RawRow> = vec![
//!     vec![CellValue::Empty, "Date".into(), "Description".into()].into(),
//!     vec![CellValue::Empty, "2024-01-05".into(), "Groceries".into(), CellValue::Number(45.5)].into(),
//!     vec![CellValue::Empty, "Total".into()].into(),
//! ];
//!
//! let records = Normalizer::default().normalize(&rows);
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].id, 1);
//! assert_eq!(records[0].paid_by, "Unknown");
//! ```

use crate::classify::{classify, RowKind};
use crate::layout::ColumnLayout;
use crate::model::{ExpenseRecord, RawRow, Shares, UNKNOWN_PAYER};
use serde::Serialize;

/// A row that produced no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    /// Position of the row in the input
    pub index: usize,
    /// Why it was skipped
    pub kind: RowKind,
}

/// Full result of a normalization pass.
///
/// Every examined row appears exactly once: as a record, as a skipped row, or
/// as the terminator in `stopped_at`. Rows after the terminator are never
/// examined.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Normalization {
    /// Accepted records, in input order
    pub records: Vec<ExpenseRecord>,
    /// Rows skipped as empty, header or summary
    pub skipped: Vec<SkippedRow>,
    /// Position of the terminator row, if one was reached
    pub stopped_at: Option<usize>,
}

impl Normalization {
    /// Number of rows the normalizer looked at.
    pub fn examined(&self) -> usize {
        self.records.len() + self.skipped.len() + usize::from(self.stopped_at.is_some())
    }
}

/// Converts raw rows into expense records using a column layout.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    layout: ColumnLayout,
}

impl Normalizer {
    /// Create a normalizer for a layout.
    pub fn new(layout: ColumnLayout) -> Self {
        Self { layout }
    }

    /// The layout in use.
    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    /// Normalize rows and return the accepted records.
    pub fn normalize(&self, rows: &[RawRow]) -> Vec<ExpenseRecord> {
        self.normalize_detailed(rows).records
    }

    /// Normalize rows and report what happened to each examined row.
    pub fn normalize_detailed(&self, rows: &[RawRow]) -> Normalization {
        let mut result = Normalization::default();

        for (index, row) in rows.iter().enumerate() {
            match classify(row, &self.layout) {
                RowKind::Data => result.records.push(self.build_record(index, row)),
                RowKind::Terminator => {
                    tracing::debug!(row = index, "terminator row, stopping");
                    result.stopped_at = Some(index);
                    break;
                }
                kind => {
                    tracing::debug!(row = index, %kind, "skipping row");
                    result.skipped.push(SkippedRow { index, kind });
                }
            }
        }

        tracing::debug!(
            accepted = result.records.len(),
            skipped = result.skipped.len(),
            stopped_at = ?result.stopped_at,
            "normalization finished"
        );

        result
    }

    /// Build a record from a row without classifying it.
    pub fn build_record(&self, id: usize, row: &RawRow) -> ExpenseRecord {
        let layout = &self.layout;

        let paid_by = row
            .cell(layout.paid_by)
            .text()
            .map(|text| text.trim().to_string())
            .unwrap_or_else(|| UNKNOWN_PAYER.to_string());

        let shares: Shares = layout
            .participants
            .iter()
            .map(|p| (p.name.as_str(), row.cell(p.column).coerce_number()))
            .collect();

        ExpenseRecord {
            id,
            date: row.cell(layout.date).text_or_empty(),
            description: row.cell(layout.description).text_or_empty(),
            amount: row.cell(layout.amount).coerce_number(),
            paid_by,
            shares,
        }
    }
}

/// Normalize rows with the default layout.
pub fn normalize(rows: &[RawRow]) -> Vec<ExpenseRecord> {
    Normalizer::default().normalize(rows)
}
