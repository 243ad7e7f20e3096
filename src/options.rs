//! Extraction options.

use crate::layout::ColumnLayout;
use crate::xlsx::SheetSelector;

/// Leading spreadsheet rows consumed as column labels by default.
pub const DEFAULT_SKIP_ROWS: usize = 1;

/// Options controlling how a workbook is turned into records.
///
/// The defaults read the first sheet, treat its first row as the column-label
/// row (row positions, and therefore record ids, start after it) and use the
/// default [`ColumnLayout`].
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Worksheet to read
    pub sheet: SheetSelector,

    /// Number of leading spreadsheet rows that are not part of the table
    pub skip_rows: usize,

    /// Column positions and participants
    pub layout: ColumnLayout,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            sheet: SheetSelector::First,
            skip_rows: DEFAULT_SKIP_ROWS,
            layout: ColumnLayout::default(),
        }
    }
}

impl ExtractOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the worksheet.
    pub fn with_sheet(mut self, sheet: SheetSelector) -> Self {
        self.sheet = sheet;
        self
    }

    /// Select a worksheet by name.
    pub fn with_sheet_name(self, name: impl Into<String>) -> Self {
        self.with_sheet(SheetSelector::Named(name.into()))
    }

    /// Set the number of leading rows to drop before positions are counted.
    pub fn with_skip_rows(mut self, rows: usize) -> Self {
        self.skip_rows = rows;
        self
    }

    /// Set the column layout.
    pub fn with_layout(mut self, layout: ColumnLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Replace the participants of the current layout.
    pub fn with_participants<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.layout = self.layout.with_participants(names);
        self
    }
}
