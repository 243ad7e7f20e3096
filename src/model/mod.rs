//! Data model shared by the reader, the normalizer and the renderers.
//!
//! The reader produces [`RawRow`]s of untyped [`CellValue`]s; the normalizer turns
//! accepted rows into [`ExpenseRecord`]s.

mod cell;
mod expense;
mod row;

pub use cell::*;
pub use expense::*;
pub use row::*;
