//! Number formats from `xl/styles.xml`, used to recognize date cells.

use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;

/// Days between 1899-12-30 (the 1900 date system's day zero) and 1970-01-01.
const EPOCH_1900_OFFSET: i64 = 25_569;

/// Days between 1904-01-01 and 1970-01-01.
const EPOCH_1904_OFFSET: i64 = 24_107;

/// Number format information of a workbook.
#[derive(Debug, Default)]
pub struct Styles {
    /// Custom number formats: numFmtId -> formatCode
    num_fmts: HashMap<u32, String>,
    /// Cell formats: style index -> numFmtId
    cell_xfs: Vec<u32>,
}

fn num_fmt_id(e: &BytesStart<'_>) -> Option<u32> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == b"numFmtId")
        .and_then(|attr| String::from_utf8_lossy(&attr.value).parse().ok())
}

impl Styles {
    /// Parse styles. Malformed content yields whatever was read before the error.
    pub fn parse(xml: &str) -> Self {
        let mut styles = Self::default();
        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut in_num_fmts = false;
        let mut in_cell_xfs = false;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                    b"numFmts" => in_num_fmts = true,
                    b"cellXfs" => in_cell_xfs = true,
                    b"numFmt" if in_num_fmts => {
                        let code = e
                            .attributes()
                            .flatten()
                            .find(|attr| attr.key.as_ref() == b"formatCode")
                            .map(|attr| String::from_utf8_lossy(&attr.value).to_string());
                        if let (Some(id), Some(code)) = (num_fmt_id(e), code) {
                            styles.num_fmts.insert(id, code);
                        }
                    }
                    b"xf" if in_cell_xfs => styles.cell_xfs.push(num_fmt_id(e).unwrap_or(0)),
                    _ => {}
                },
                Ok(Event::End(ref e)) => match e.name().as_ref() {
                    b"numFmts" => in_num_fmts = false,
                    b"cellXfs" => in_cell_xfs = false,
                    _ => {}
                },
                Ok(Event::Eof) | Err(_) => break,
                _ => {}
            }
            buf.clear();
        }

        styles
    }

    /// Check if the cell style at `style_index` formats numbers as dates.
    pub fn is_date_style(&self, style_index: usize) -> bool {
        self.cell_xfs
            .get(style_index)
            .is_some_and(|&id| self.is_date_format(id))
    }

    /// Check if a numFmtId is a date or time format.
    pub fn is_date_format(&self, num_fmt_id: u32) -> bool {
        // Built-in: 14-22 dates, 45-47 times
        if (14..=22).contains(&num_fmt_id) || (45..=47).contains(&num_fmt_id) {
            return true;
        }

        self.num_fmts
            .get(&num_fmt_id)
            .is_some_and(|code| is_date_format_code(code))
    }
}

/// Check if a format code contains date tokens outside of quoted text and
/// bracketed sections such as `[Red]` or `[$-409]`.
fn is_date_format_code(format_code: &str) -> bool {
    let mut in_bracket = false;
    let mut in_quote = false;
    let mut escaped = false;

    for c in format_code.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if !in_quote => escaped = true,
            '"' => in_quote = !in_quote,
            '[' if !in_quote => in_bracket = true,
            ']' if !in_quote => in_bracket = false,
            _ if in_bracket || in_quote => {}
            'd' | 'D' | 'y' | 'Y' => return true,
            // A bare month token only counts next to other date parts, which the
            // arms above already catch; "mm:ss" alone is a duration.
            _ => {}
        }
    }

    false
}

/// Convert an Excel serial number to ISO 8601 text.
///
/// Whole days render as `YYYY-MM-DD`, fractional days as
/// `YYYY-MM-DDTHH:MM:SS`. Serials below 1 (pure times) and negative serials
/// return `None`. In the 1900 system, serials before 60 are shifted one day to
/// compensate for the fictitious 1900-02-29.
pub fn serial_to_datetime(serial: f64, date1904: bool) -> Option<String> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }

    let mut days = serial.floor() as i64;
    let mut seconds = ((serial - serial.floor()) * 86_400.0).round() as i64;
    if seconds >= 86_400 {
        days += 1;
        seconds -= 86_400;
    }

    let unix_days = if date1904 {
        days - EPOCH_1904_OFFSET
    } else if days < 60 {
        days + 1 - EPOCH_1900_OFFSET
    } else {
        days - EPOCH_1900_OFFSET
    };

    let (year, month, day) = civil_from_days(unix_days);
    if seconds == 0 {
        Some(format!("{:04}-{:02}-{:02}", year, month, day))
    } else {
        Some(format!(
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            year,
            month,
            day,
            seconds / 3600,
            (seconds % 3600) / 60,
            seconds % 60
        ))
    }
}

/// Proleptic Gregorian date of a day count relative to 1970-01-01.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}
