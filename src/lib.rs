//! # splitsheet
//!
//! Shared-expense spreadsheet extraction to normalized records.
//!
//! A typical expense sheet has title rows, blank rows, repeated header rows and
//! trailing totals around the actual expenses. This library reads one
//! worksheet, classifies every row, and turns each expense row into an
//! [`ExpenseRecord`] with a date, description, amount, payer and per-person
//! shares.
//!
//! ## Quick Start
//!
//! ```no_run
//! use splitsheet::{extract_file, render};
//!
//! let records = extract_file("Oct 19 - Nov 21.xlsx")?;
//! println!("Expenses: {}", records.len());
//!
//! let json = render::to_json(&records, render::JsonFormat::Pretty)?;
//! std::fs::write("initialData.json", json)?;
//! # Ok::<(), splitsheet::Error>(())
//! ```
//!
//! ## Working With Rows Directly
//!
//! ```
//! use splitsheet::{locate, CellValue, Normalizer, RawRow};
//!
//! let rows: Vec<RawRow> = vec![
//!     vec![CellValue::Empty, "Date".into(), "Description".into()].into(),
//!     vec![CellValue::Empty, "2024-01-05".into(), "Groceries".into()].into(),
//! ];
//!
//! assert_eq!(locate(&rows), Some(0));
//! assert_eq!(Normalizer::default().normalize(&rows).len(), 1);
//! ```
//!
//! ## Features
//!
//! - `async`: `extract_file_async`, reading the file with Tokio

pub mod balances;
pub mod classify;
pub mod container;
pub mod detect;
pub mod error;
pub mod layout;
pub mod locate;
pub mod model;
pub mod normalize;
pub mod options;
pub mod render;
pub mod xlsx;

// Re-exports
pub use balances::{compute_balances, compute_settlements, Balance, Balances, Settlement};
pub use classify::{classify, RowKind};
pub use detect::{detect_format_from_bytes, detect_format_from_path, WorkbookFormat};
pub use error::{Error, Result};
pub use layout::{ColumnLayout, Participant, DEFAULT_PARTICIPANTS};
pub use locate::{dense_rows, locate, summarize, RowSummary};
pub use model::{CellValue, ExpenseRecord, RawRow, Shares, UNKNOWN_PAYER};
pub use normalize::{normalize, Normalization, Normalizer, SkippedRow};
pub use options::ExtractOptions;
pub use xlsx::{SheetSelector, Workbook};

use std::path::Path;

/// Everything learned from one extraction run.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Detected workbook flavor
    pub format: WorkbookFormat,
    /// Name of the sheet that was read
    pub sheet: String,
    /// Every row of the sheet, from spreadsheet row 1
    pub rows: Vec<RawRow>,
    /// Leading rows left out of the table
    pub skip_rows: usize,
    /// First sheet row mentioning a header keyword, if any
    pub header_row: Option<usize>,
    /// Normalizer result over the table rows
    pub normalization: Normalization,
}

impl Extraction {
    /// Rows the normalizer saw: the sheet minus the skipped leading rows.
    ///
    /// Record ids and skipped-row indices are positions in this slice.
    pub fn table_rows(&self) -> &[RawRow] {
        &self.rows[self.skip_rows.min(self.rows.len())..]
    }

    /// The accepted records.
    pub fn records(&self) -> &[ExpenseRecord] {
        &self.normalization.records
    }

    /// Take the accepted records.
    pub fn into_records(self) -> Vec<ExpenseRecord> {
        self.normalization.records
    }
}

/// Read the table rows of a workbook: the selected sheet minus the skipped
/// leading rows.
pub fn read_rows(workbook: &Workbook, options: &ExtractOptions) -> Result<Vec<RawRow>> {
    let mut rows = workbook.rows(&options.sheet)?;
    let skip = options.skip_rows.min(rows.len());
    rows.drain(..skip);
    Ok(rows)
}

/// Run the locator and normalizer over an opened workbook.
///
/// The locator scans the whole sheet, so `header_row` is a sheet row
/// position. The normalizer only sees the rows after `skip_rows`.
pub fn extract_workbook(workbook: &Workbook, options: &ExtractOptions) -> Result<Extraction> {
    let sheet = workbook.sheet_name(&options.sheet)?.to_string();
    let rows = workbook.rows(&options.sheet)?;
    let skip_rows = options.skip_rows.min(rows.len());

    let header_row = locate(&rows);
    let normalization =
        Normalizer::new(options.layout.clone()).normalize_detailed(&rows[skip_rows..]);

    tracing::info!(
        sheet = %sheet,
        rows = rows.len(),
        records = normalization.records.len(),
        "extracted expenses"
    );

    Ok(Extraction {
        format: workbook.format(),
        sheet,
        rows,
        skip_rows,
        header_row,
        normalization,
    })
}

/// Extract expense records from a workbook file with default options.
///
/// # Example
///
/// ```no_run
/// let records = splitsheet::extract_file("expenses.xlsx")?;
/// for record in &records {
///     println!("{} {} {}", record.date, record.description, record.amount);
/// }
/// # Ok::<(), splitsheet::Error>(())
/// ```
pub fn extract_file(path: impl AsRef<Path>) -> Result<Vec<ExpenseRecord>> {
    extract_file_with_options(path, &ExtractOptions::default()).map(Extraction::into_records)
}

/// Extract expense records from a workbook file.
///
/// # Example
///
/// ```no_run
/// use splitsheet::{extract_file_with_options, ExtractOptions};
///
/// let options = ExtractOptions::new()
///     .with_sheet_name("November")
///     .with_participants(["Ana", "Ben", "Cy"]);
///
/// let extraction = extract_file_with_options("expenses.xlsx", &options)?;
/// println!("Header row: {:?}", extraction.header_row);
/// # Ok::<(), splitsheet::Error>(())
/// ```
pub fn extract_file_with_options(
    path: impl AsRef<Path>,
    options: &ExtractOptions,
) -> Result<Extraction> {
    let workbook = Workbook::open(path)?;
    extract_workbook(&workbook, options)
}

/// Extract expense records from workbook bytes with default options.
pub fn extract_bytes(data: &[u8]) -> Result<Vec<ExpenseRecord>> {
    extract_bytes_with_options(data, &ExtractOptions::default()).map(Extraction::into_records)
}

/// Extract expense records from workbook bytes.
pub fn extract_bytes_with_options(data: &[u8], options: &ExtractOptions) -> Result<Extraction> {
    let workbook = Workbook::from_bytes(data.to_vec())?;
    extract_workbook(&workbook, options)
}

/// Extract expense records from a workbook file, reading it with Tokio.
#[cfg(feature = "async")]
pub async fn extract_file_async(
    path: impl AsRef<Path>,
    options: &ExtractOptions,
) -> Result<Extraction> {
    let data = tokio::fs::read(path.as_ref()).await?;
    let workbook = Workbook::from_bytes(data)?;
    extract_workbook(&workbook, options)
}
