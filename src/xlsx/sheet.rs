//! Worksheet XML to raw rows.

use crate::error::{Error, Result};
use crate::model::{CellValue, RawRow};
use quick_xml::events::{BytesStart, Event};

use super::shared_strings::SharedStrings;
use super::styles::{serial_to_datetime, Styles};

/// Columns per worksheet (`A` to `XFD`).
pub const MAX_COLUMNS: usize = 16_384;

/// Rows per worksheet.
pub const MAX_ROWS: usize = 1_048_576;

/// Workbook-level lookups needed to resolve cell values.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CellContext<'a> {
    pub shared_strings: &'a SharedStrings,
    pub styles: &'a Styles,
    pub date1904: bool,
}

/// Cell being read.
#[derive(Debug, Default)]
struct PendingCell {
    column: usize,
    cell_type: Option<String>,
    style: Option<usize>,
    value: String,
    has_value: bool,
}

/// Convert column letters of a cell reference to a 0-based index.
///
/// `A1` is column 0, `AB12` is column 27. Returns `None` when the reference has
/// no leading letters or points past column `XFD`.
pub fn column_index(reference: &str) -> Option<usize> {
    let letters: Vec<u8> = reference
        .bytes()
        .take_while(u8::is_ascii_alphabetic)
        .collect();
    if letters.is_empty() {
        return None;
    }

    let number = letters.iter().try_fold(0usize, |acc, &b| {
        acc.checked_mul(26)?
            .checked_add(usize::from(b.to_ascii_uppercase() - b'A' + 1))
            .filter(|&n| n <= MAX_COLUMNS)
    })?;
    Some(number - 1)
}

fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

/// Parse a worksheet into rows.
///
/// The result holds every row from the first spreadsheet row to the last row
/// with a value. Rows missing from the XML come back blank, and cells are
/// placed by their reference so gaps read as [`CellValue::Empty`].
pub(crate) fn parse_sheet(xml: &str, context: CellContext<'_>) -> Result<Vec<RawRow>> {
    let mut rows: Vec<RawRow> = Vec::new();
    let mut reader = quick_xml::Reader::from_str(xml);

    let mut buf = Vec::new();
    let mut current_row: Option<(usize, RawRow)> = None;
    let mut next_row = 0usize;
    let mut next_column = 0usize;
    let mut cell: Option<PendingCell> = None;
    let mut in_value = false;
    let mut phonetic_depth = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"row" => {
                    let index = row_index(e, next_row)?;
                    current_row = Some((index, RawRow::default()));
                    next_row = index + 1;
                    next_column = 0;
                }
                b"c" if current_row.is_some() => {
                    let pending = start_cell(e, next_column)?;
                    next_column = pending.column + 1;
                    cell = Some(pending);
                }
                b"rPh" => phonetic_depth += 1,
                b"v" | b"t" if cell.is_some() && phonetic_depth == 0 => {
                    in_value = true;
                    if let Some(ref mut pending) = cell {
                        pending.has_value = true;
                    }
                }
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"row" => {
                    let index = row_index(e, next_row)?;
                    push_row(&mut rows, index, RawRow::default());
                    next_row = index + 1;
                }
                b"c" if current_row.is_some() => {
                    // Styled but valueless cell
                    next_column = start_cell(e, next_column)?.column + 1;
                }
                b"v" | b"t" if cell.is_some() && phonetic_depth == 0 => {
                    if let Some(ref mut pending) = cell {
                        pending.has_value = true;
                    }
                }
                _ => {}
            },
            Ok(Event::Text(ref e)) if in_value => {
                let text = e.unescape().map_err(|err| Error::XmlParse(err.to_string()))?;
                if let Some(ref mut pending) = cell {
                    pending.value.push_str(&text);
                }
            }
            Ok(Event::CData(ref e)) if in_value => {
                if let Some(ref mut pending) = cell {
                    pending.value.push_str(&String::from_utf8_lossy(e));
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"row" => {
                    if let Some((index, row)) = current_row.take() {
                        push_row(&mut rows, index, row);
                    }
                }
                b"c" => {
                    if let (Some(pending), Some((_, row))) = (cell.take(), current_row.as_mut()) {
                        let value = resolve_cell(&pending, context);
                        if !value.is_empty() {
                            row.set(pending.column, value);
                        }
                    }
                    in_value = false;
                }
                b"v" | b"t" => in_value = false,
                b"rPh" => phonetic_depth = phonetic_depth.saturating_sub(1),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    while rows.last().is_some_and(RawRow::is_blank) {
        rows.pop();
    }

    Ok(rows)
}

/// 0-based row index from the `r` attribute, or `next_row` when it is absent.
fn row_index(e: &BytesStart<'_>, next_row: usize) -> Result<usize> {
    let index = match attribute(e, b"r") {
        Some(r) => r
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|&n| n > 0)
            .map(|n| n - 1)
            .ok_or_else(|| Error::XmlParse(format!("invalid row reference: {}", r)))?,
        None => next_row,
    };

    if index >= MAX_ROWS {
        return Err(Error::XmlParse(format!(
            "row {} is past the worksheet limit",
            index + 1
        )));
    }
    Ok(index)
}

fn start_cell(e: &BytesStart<'_>, next_column: usize) -> Result<PendingCell> {
    let column = match attribute(e, b"r") {
        Some(r) if r.starts_with(|c: char| c.is_ascii_alphabetic()) => column_index(&r)
            .ok_or_else(|| Error::XmlParse(format!("cell reference out of range: {}", r)))?,
        _ => next_column,
    };

    if column >= MAX_COLUMNS {
        return Err(Error::XmlParse(format!(
            "column {} is past the worksheet limit",
            column + 1
        )));
    }

    Ok(PendingCell {
        column,
        cell_type: attribute(e, b"t"),
        style: attribute(e, b"s").and_then(|s| s.parse().ok()),
        value: String::new(),
        has_value: false,
    })
}

fn push_row(rows: &mut Vec<RawRow>, index: usize, mut row: RawRow) {
    row.trim_end();
    if index >= rows.len() {
        rows.resize(index + 1, RawRow::default());
    }
    rows[index] = row;
}

/// Turn raw cell text into a typed value.
fn resolve_cell(cell: &PendingCell, context: CellContext<'_>) -> CellValue {
    if !cell.has_value {
        return CellValue::Empty;
    }
    let raw = cell.value.as_str();

    match cell.cell_type.as_deref() {
        Some("s") => match raw.trim().parse::<usize>() {
            Ok(idx) => context
                .shared_strings
                .get(idx)
                .map(|s| CellValue::Text(s.to_string()))
                .unwrap_or(CellValue::Empty),
            Err(_) => CellValue::Text(raw.to_string()),
        },
        Some("b") => CellValue::Bool(raw.trim() == "1"),
        Some("e") => CellValue::Error(raw.to_string()),
        Some("str") | Some("inlineStr") => CellValue::Text(raw.to_string()),
        Some("d") => CellValue::DateTime(raw.trim().to_string()),
        _ => match raw.trim().parse::<f64>() {
            Ok(n) => {
                let is_date = cell
                    .style
                    .is_some_and(|style| context.styles.is_date_style(style));
                is_date
                    .then(|| serial_to_datetime(n, context.date1904))
                    .flatten()
                    .map(CellValue::DateTime)
                    .unwrap_or(CellValue::Number(n))
            }
            Err(_) if raw.is_empty() => CellValue::Empty,
            Err(_) => CellValue::Text(raw.to_string()),
        },
    }
}
