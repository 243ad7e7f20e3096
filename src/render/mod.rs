//! Output rendering for extracted records.
//!
//! # Example
//!
//! ```no_run
//! use splitsheet::render::{to_json, JsonFormat};
//!
//! let records = splitsheet::extract_file("expenses.xlsx")?;
//! let json = to_json(&records, JsonFormat::Pretty)?;
//! std::fs::write("initialData.json", json)?;
//! # Ok::<(), splitsheet::Error>(())
//! ```

mod json;

pub use json::{to_json, to_json_default, JsonFormat};
