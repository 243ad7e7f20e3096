//! XLSX workbook reader.
//!
//! Reads one worksheet of an Office Open XML workbook into [`RawRow`]s.
//!
//! # Example
//!
//! ```no_run
//! use splitsheet::xlsx::{SheetSelector, Workbook};
//!
//! let workbook = Workbook::open("expenses.xlsx")?;
//! println!("Sheets: {:?}", workbook.sheet_names());
//!
//! let rows = workbook.rows(&SheetSelector::First)?;
//! println!("Rows: {}", rows.len());
//! # Ok::<(), splitsheet::Error>(())
//! ```
//!
//! [`RawRow`]: crate::model::RawRow

mod shared_strings;
mod sheet;
mod styles;
mod workbook;

pub use sheet::{column_index, MAX_COLUMNS, MAX_ROWS};
pub use styles::serial_to_datetime;
pub use workbook::{SheetSelector, Workbook};
