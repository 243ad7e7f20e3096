//! End-to-end extraction from XLSX workbooks.
//!
//! Workbooks are assembled in memory so the tests do not depend on fixture
//! files.
//!
//! Run with: cargo test --test workbook_extraction

use std::io::{Cursor, Write};
use splitsheet::{
    dense_rows, extract_bytes, extract_bytes_with_options, extract_file, ColumnLayout, Error,
    ExtractOptions, RowKind, SheetSelector, Workbook, WorkbookFormat,
};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// A cell to place in a generated sheet.
#[derive(Clone)]
enum Cell {
    Str(&'static str),
    Num(f64),
    /// Excel date serial, written with a built-in date format
    Date(f64),
    Blank,
}

use Cell::{Blank, Date, Num, Str};

/// A generated row: its 1-based sheet row number and cells from column A.
type SheetRow = (usize, Vec<Cell>);

fn column_letters(mut idx: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (idx % 26) as u8);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn sheet_xml(rows: &[SheetRow], strings: &mut Vec<String>) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );

    for (number, cells) in rows {
        xml.push_str(&format!(r#"<row r="{}">"#, number));
        for (col, cell) in cells.iter().enumerate() {
            let reference = format!("{}{}", column_letters(col), number);
            match cell {
                Str(text) => {
                    let idx = match strings.iter().position(|s| s == text) {
                        Some(idx) => idx,
                        None => {
                            strings.push(text.to_string());
                            strings.len() - 1
                        }
                    };
                    xml.push_str(&format!(r#"<c r="{}" t="s"><v>{}</v></c>"#, reference, idx));
                }
                Num(n) => xml.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, reference, n)),
                Date(serial) => {
                    xml.push_str(&format!(r#"<c r="{}" s="1"><v>{}</v></c>"#, reference, serial))
                }
                Blank => {}
            }
        }
        xml.push_str("</row>");
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

fn build_workbook(sheets: &[(&str, Vec<SheetRow>)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

    let mut content_types = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
    );
    let mut workbook = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#,
    );
    let mut rels = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );

    let mut strings = Vec::new();
    let mut sheet_parts = Vec::new();
    for (idx, (name, rows)) in sheets.iter().enumerate() {
        let number = idx + 1;
        content_types.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
            number
        ));
        workbook.push_str(&format!(
            r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            escape(name),
            number,
            number
        ));
        rels.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
            number, number
        ));
        sheet_parts.push((
            format!("xl/worksheets/sheet{}.xml", number),
            sheet_xml(rows, &mut strings),
        ));
    }

    content_types.push_str("</Types>");
    workbook.push_str("</sheets></workbook>");
    rels.push_str("</Relationships>");

    let mut shared = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{0}" uniqueCount="{0}">"#,
        strings.len()
    );
    for s in &strings {
        shared.push_str(&format!(r#"<si><t xml:space="preserve">{}</t></si>"#, escape(s)));
    }
    shared.push_str("</sst>");

    let styles = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <cellXfs count="2"><xf numFmtId="0" fontId="0"/><xf numFmtId="14" fontId="0" applyNumberFormat="1"/></cellXfs>
</styleSheet>"#;

    let package_rels = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

    let mut parts = vec![
        ("[Content_Types].xml".to_string(), content_types),
        ("_rels/.rels".to_string(), package_rels.to_string()),
        ("xl/workbook.xml".to_string(), workbook),
        ("xl/_rels/workbook.xml.rels".to_string(), rels),
        ("xl/sharedStrings.xml".to_string(), shared),
        ("xl/styles.xml".to_string(), styles.to_string()),
    ];
    parts.extend(sheet_parts);

    for (name, content) in parts {
        zip.start_file(name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }

    zip.finish().unwrap().into_inner()
}

/// An expense sheet shaped like a hand-maintained trip spreadsheet.
fn expense_sheet() -> Vec<SheetRow> {
    vec![
        (1, vec![Str("Oct 19 - Nov 21")]),
        (
            3,
            vec![
                Str("#"),
                Str("Date"),
                Str("Description"),
                Str("Amount"),
                Str("Who Paid"),
                Str("Hamza"),
                Str("Zumair"),
                Str("Faisal"),
            ],
        ),
        (
            4,
            vec![
                Num(1.0),
                Date(45296.0),
                Str("Groceries"),
                Num(45.5),
                Str(" Hamza "),
                Num(15.0),
                Num(15.0),
                Num(15.5),
            ],
        ),
        (
            5,
            vec![
                Num(2.0),
                Date(45297.0),
                Str("Fuel"),
                Num(60.0),
                Str("Zumair"),
                Num(20.0),
                Num(20.0),
                Num(20.0),
            ],
        ),
        (
            7,
            vec![
                Num(3.0),
                Str("2024-01-09"),
                Str("Dinner"),
                Str("N/A"),
                Blank,
                Str("x"),
                Blank,
                Num(10.0),
            ],
        ),
        (8, vec![Blank, Blank, Str("TOTAL"), Num(105.5)]),
        (9, vec![Blank, Blank, Str("Per Person"), Blank, Blank, Num(35.0)]),
        (10, vec![Blank, Str("Total")]),
        (
            11,
            vec![Num(4.0), Date(45300.0), Str("After total"), Num(99.0), Str("Faisal")],
        ),
    ]
}

#[test]
fn test_extract_default_options() {
    let data = build_workbook(&[("Trip", expense_sheet())]);
    let records = extract_bytes(&data).expect("workbook should extract");

    let ids: Vec<_> = records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![2, 3, 5]);

    let groceries = &records[0];
    assert_eq!(groceries.date, "2024-01-05");
    assert_eq!(groceries.description, "Groceries");
    assert_eq!(groceries.amount, 45.5);
    assert_eq!(groceries.paid_by, "Hamza");
    let shares: Vec<_> = groceries.shares.iter().collect();
    assert_eq!(shares, vec![("Hamza", 15.0), ("Zumair", 15.0), ("Faisal", 15.5)]);

    let fuel = &records[1];
    assert_eq!(fuel.date, "2024-01-06");
    assert_eq!(fuel.paid_by, "Zumair");

    let dinner = &records[2];
    assert_eq!(dinner.date, "2024-01-09");
    assert_eq!(dinner.amount, 0.0);
    assert_eq!(dinner.paid_by, "Unknown");
    assert_eq!(dinner.shares.get("Hamza"), Some(0.0));
    assert_eq!(dinner.shares.get("Zumair"), Some(0.0));
    assert_eq!(dinner.shares.get("Faisal"), Some(10.0));
}

#[test]
fn test_extraction_report() {
    let data = build_workbook(&[("Trip", expense_sheet())]);
    let extraction = extract_bytes_with_options(&data, &ExtractOptions::default()).unwrap();

    assert_eq!(extraction.format, WorkbookFormat::Xlsx);
    assert_eq!(extraction.sheet, "Trip");
    assert_eq!(extraction.rows.len(), 11);
    assert_eq!(extraction.table_rows().len(), 10);
    assert_eq!(extraction.header_row, Some(2));

    let normalization = &extraction.normalization;
    assert_eq!(normalization.stopped_at, Some(8));
    let skipped: Vec<_> = normalization
        .skipped
        .iter()
        .map(|s| (s.index, s.kind))
        .collect();
    assert_eq!(
        skipped,
        vec![
            (0, RowKind::Empty),
            (1, RowKind::Header),
            (4, RowKind::Empty),
            (6, RowKind::Summary),
            (7, RowKind::Summary),
        ]
    );
    assert_eq!(normalization.examined(), 9);
    assert!(extraction.records().iter().all(|r| r.description != "After total"));
}

#[test]
fn test_no_skipped_leading_rows() {
    let data = build_workbook(&[("Trip", expense_sheet())]);
    let options = ExtractOptions::new().with_skip_rows(0);
    let extraction = extract_bytes_with_options(&data, &options).unwrap();

    let ids: Vec<_> = extraction.records().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![3, 4, 6]);
    assert_eq!(extraction.header_row, Some(2));
}

#[test]
fn test_header_in_first_row() {
    let rows = vec![
        (
            1,
            vec![
                Str("#"),
                Str("Date"),
                Str("Description"),
                Str("Amount"),
                Str("Who Paid"),
            ],
        ),
        (
            2,
            vec![Num(1.0), Str("2024-02-01"), Str("Taxi"), Num(18.0), Str("Faisal")],
        ),
    ];
    let data = build_workbook(&[("Sheet1", rows)]);
    let extraction = extract_bytes_with_options(&data, &ExtractOptions::default()).unwrap();

    assert_eq!(extraction.header_row, Some(0));
    assert_eq!(extraction.records().len(), 1);
    assert_eq!(extraction.records()[0].id, 0);

    let dense: Vec<_> = dense_rows(
        &extraction.rows,
        splitsheet::locate::DEFAULT_MIN_FILLED,
        splitsheet::locate::DEFAULT_LAST_INDEX,
    )
    .into_iter()
    .map(|(idx, _)| idx)
    .collect();
    assert_eq!(dense, vec![0, 1]);
}

#[test]
fn test_select_sheet_by_name() {
    let notes = vec![(1, vec![Str("Notes only")])];
    let data = build_workbook(&[("Notes", notes), ("Trip", expense_sheet())]);

    let first = extract_bytes(&data).unwrap();
    assert!(first.is_empty());

    let options = ExtractOptions::new().with_sheet_name("Trip");
    let extraction = extract_bytes_with_options(&data, &options).unwrap();
    assert_eq!(extraction.records().len(), 3);

    let options = ExtractOptions::new().with_sheet(SheetSelector::Index(1));
    assert_eq!(extract_bytes_with_options(&data, &options).unwrap().sheet, "Trip");
}

#[test]
fn test_missing_sheet() {
    let data = build_workbook(&[("Trip", expense_sheet())]);

    let options = ExtractOptions::new().with_sheet_name("December");
    let err = extract_bytes_with_options(&data, &options).unwrap_err();
    assert!(matches!(err, Error::SheetNotFound(ref name) if name == "December"));

    let options = ExtractOptions::new().with_sheet(SheetSelector::Index(4));
    assert!(matches!(
        extract_bytes_with_options(&data, &options),
        Err(Error::SheetNotFound(_))
    ));
}

#[test]
fn test_custom_participants() {
    let rows = vec![
        (1, vec![Str("Header")]),
        (
            2,
            vec![Blank, Str("2024-03-01"), Str("Cabin"), Num(300.0), Str("Ana"), Num(100.0), Num(200.0)],
        ),
    ];
    let data = build_workbook(&[("Sheet1", rows)]);

    let layout = ColumnLayout::default().with_participants(["Ana", "Ben"]);
    let options = ExtractOptions::new().with_layout(layout);
    let extraction = extract_bytes_with_options(&data, &options).unwrap();

    let record = &extraction.records()[0];
    assert_eq!(record.id, 0);
    let shares: Vec<_> = record.shares.iter().collect();
    assert_eq!(shares, vec![("Ana", 100.0), ("Ben", 200.0)]);
}

#[test]
fn test_workbook_metadata() {
    let data = build_workbook(&[("Trip", expense_sheet()), ("Archive", vec![])]);
    let workbook = Workbook::from_bytes(data).unwrap();

    assert_eq!(workbook.sheet_count(), 2);
    assert_eq!(workbook.sheet_names(), vec!["Trip", "Archive"]);
    assert!(!workbook.uses_1904_dates());
    assert!(workbook.rows(&SheetSelector::Index(1)).unwrap().is_empty());
}

#[test]
fn test_extract_file_from_disk() {
    let data = build_workbook(&[("Trip", expense_sheet())]);
    let mut file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
    file.write_all(&data).unwrap();
    file.flush().unwrap();

    let records = extract_file(file.path()).unwrap();
    assert_eq!(records.len(), 3);
}

#[test]
fn test_corrupt_archive() {
    let mut data = build_workbook(&[("Trip", expense_sheet())]);
    data.truncate(40);
    assert!(extract_bytes(&data).is_err());
}

#[cfg(feature = "async")]
#[tokio::test]
async fn test_extract_file_async() {
    let data = build_workbook(&[("Trip", expense_sheet())]);
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&data).unwrap();

    let extraction = splitsheet::extract_file_async(file.path(), &ExtractOptions::default())
        .await
        .unwrap();
    assert_eq!(extraction.records().len(), 3);
}
