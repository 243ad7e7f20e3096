//! Raw, positionally addressed rows.

use super::CellValue;
use serde::{Deserialize, Serialize};
use std::fmt;

static EMPTY_CELL: CellValue = CellValue::Empty;

/// One row of untyped cell values, indexed by column position.
///
/// Positions past the end of the row read as [`CellValue::Empty`], so short rows
/// behave like rows padded with blank cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRow {
    cells: Vec<CellValue>,
}

impl RawRow {
    /// Create a row from cell values.
    pub fn new(cells: Vec<CellValue>) -> Self {
        Self { cells }
    }

    /// Get the cell at a column position.
    pub fn cell(&self, column: usize) -> &CellValue {
        self.cells.get(column).unwrap_or(&EMPTY_CELL)
    }

    /// Set the cell at a column position, padding with empty cells as needed.
    ///
    /// Padding allocates every position up to `column`; the sheet reader
    /// rejects columns past [`MAX_COLUMNS`](crate::xlsx::MAX_COLUMNS) before
    /// calling this.
    pub fn set(&mut self, column: usize, value: CellValue) {
        if column >= self.cells.len() {
            self.cells.resize(column + 1, CellValue::Empty);
        }
        self.cells[column] = value;
    }

    /// All stored cells.
    pub fn cells(&self) -> &[CellValue] {
        &self.cells
    }

    /// Number of stored positions.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the row stores no positions at all.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Count of cells holding a value.
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }

    /// Check if every cell is missing.
    pub fn is_blank(&self) -> bool {
        self.filled_count() == 0
    }

    /// Drop trailing missing cells.
    pub fn trim_end(&mut self) {
        while matches!(self.cells.last(), Some(CellValue::Empty)) {
            self.cells.pop();
        }
    }
}

/// Renders the row as a bracketed list of cell texts.
impl fmt::Display for RawRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (idx, cell) in self.cells.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", cell)?;
        }
        f.write_str("]")
    }
}

impl From<Vec<CellValue>> for RawRow {
    fn from(cells: Vec<CellValue>) -> Self {
        Self::new(cells)
    }
}

impl FromIterator<CellValue> for RawRow {
    fn from_iter<I: IntoIterator<Item = CellValue>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
