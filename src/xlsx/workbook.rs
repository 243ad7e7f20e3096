//! Workbook reader.

use crate::container::OoxmlPackage;
use crate::detect::{detect_format_from_bytes, WorkbookFormat};
use crate::error::{Error, Result};
use crate::model::RawRow;
use quick_xml::events::Event;
use std::fmt;
use std::path::Path;

use super::sheet::{parse_sheet, CellContext};
use super::shared_strings::SharedStrings;
use super::styles::Styles;

const WORKBOOK_PART: &str = "xl/workbook.xml";

/// Which worksheet to read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SheetSelector {
    /// The first sheet in workbook order
    #[default]
    First,
    /// A sheet by its exact name
    Named(String),
    /// A sheet by 0-based position
    Index(usize),
}

impl fmt::Display for SheetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetSelector::First => f.write_str("first sheet"),
            SheetSelector::Named(name) => write!(f, "\"{}\"", name),
            SheetSelector::Index(idx) => write!(f, "#{}", idx),
        }
    }
}

/// Sheet entry from workbook.xml.
#[derive(Debug, Clone)]
struct SheetInfo {
    name: String,
    part: String,
}

/// An opened XLSX workbook.
pub struct Workbook {
    package: OoxmlPackage,
    format: WorkbookFormat,
    shared_strings: SharedStrings,
    styles: Styles,
    sheets: Vec<SheetInfo>,
    date1904: bool,
}

impl Workbook {
    /// Open a workbook file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        Self::from_bytes(data)
    }

    /// Open a workbook from bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let format = detect_format_from_bytes(&data)?;
        let package = OoxmlPackage::from_bytes(data)?;
        Self::from_package(package, format)
    }

    fn from_package(package: OoxmlPackage, format: WorkbookFormat) -> Result<Self> {
        let workbook_xml = package.read_xml(WORKBOOK_PART)?;
        let relationships = package.read_relationships(WORKBOOK_PART)?;
        let (entries, date1904) = parse_workbook(&workbook_xml)?;

        let sheets: Vec<SheetInfo> = entries
            .into_iter()
            .enumerate()
            .map(|(idx, (name, rel_id))| {
                let part = relationships
                    .target(&rel_id)
                    .map(|target| OoxmlPackage::resolve_path(WORKBOOK_PART, target))
                    .unwrap_or_else(|| format!("xl/worksheets/sheet{}.xml", idx + 1));
                SheetInfo { name, part }
            })
            .collect();

        let shared_strings = match package.read_optional_xml("xl/sharedStrings.xml")? {
            Some(xml) => SharedStrings::parse(&xml)?,
            None => SharedStrings::default(),
        };

        let styles = package
            .read_optional_xml("xl/styles.xml")?
            .map(|xml| Styles::parse(&xml))
            .unwrap_or_default();

        tracing::debug!(
            %format,
            sheets = ?names_of(&sheets),
            shared_strings = shared_strings.len(),
            date1904,
            "opened workbook"
        );

        Ok(Self {
            package,
            format,
            shared_strings,
            styles,
            sheets,
            date1904,
        })
    }

    /// The detected workbook flavor.
    pub fn format(&self) -> WorkbookFormat {
        self.format
    }

    /// Get the number of sheets.
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Get sheet names in workbook order.
    pub fn sheet_names(&self) -> Vec<&str> {
        names_of(&self.sheets)
    }

    /// Whether the workbook counts dates from 1904.
    pub fn uses_1904_dates(&self) -> bool {
        self.date1904
    }

    /// Resolve a selector to a sheet position.
    pub fn sheet_index(&self, selector: &SheetSelector) -> Result<usize> {
        if self.sheets.is_empty() {
            return Err(Error::NoSheets);
        }
        match selector {
            SheetSelector::First => Ok(0),
            SheetSelector::Index(idx) if *idx < self.sheets.len() => Ok(*idx),
            SheetSelector::Named(name) => self
                .sheets
                .iter()
                .position(|s| s.name == *name)
                .ok_or_else(|| Error::SheetNotFound(name.clone())),
            other => Err(Error::SheetNotFound(other.to_string())),
        }
    }

    /// Name of the sheet a selector points at.
    pub fn sheet_name(&self, selector: &SheetSelector) -> Result<&str> {
        let idx = self.sheet_index(selector)?;
        Ok(self.sheets[idx].name.as_str())
    }

    /// Read every row of a sheet.
    pub fn rows(&self, selector: &SheetSelector) -> Result<Vec<RawRow>> {
        let sheet = &self.sheets[self.sheet_index(selector)?];
        let xml = self.package.read_xml(&sheet.part)?;

        let context = CellContext {
            shared_strings: &self.shared_strings,
            styles: &self.styles,
            date1904: self.date1904,
        };
        let rows = parse_sheet(&xml, context)?;

        tracing::debug!(sheet = %sheet.name, rows = rows.len(), "read sheet");
        Ok(rows)
    }
}

impl fmt::Debug for Workbook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workbook")
            .field("format", &self.format)
            .field("sheets", &self.sheet_names())
            .finish()
    }
}

fn names_of(sheets: &[SheetInfo]) -> Vec<&str> {
    sheets.iter().map(|s| s.name.as_str()).collect()
}

/// Sheet (name, relationship ID) pairs and the 1904 date flag.
fn parse_workbook(xml: &str) -> Result<(Vec<(String, String)>, bool)> {
    let mut sheets = Vec::new();
    let mut date1904 = false;
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"sheet" => {
                    let mut name = String::new();
                    let mut rel_id = String::new();
                    for attr in e.attributes().flatten() {
                        let value = attr
                            .unescape_value()
                            .map(|v| v.to_string())
                            .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).to_string());
                        match attr.key.as_ref() {
                            b"name" => name = value,
                            b"r:id" => rel_id = value,
                            key if key.ends_with(b":id") && rel_id.is_empty() => rel_id = value,
                            _ => {}
                        }
                    }
                    if !name.is_empty() {
                        sheets.push((name, rel_id));
                    }
                }
                b"workbookPr" => {
                    date1904 = e
                        .attributes()
                        .flatten()
                        .find(|attr| attr.key.as_ref() == b"date1904")
                        .is_some_and(|attr| matches!(attr.value.as_ref(), b"1" | b"true"));
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok((sheets, date1904))
}
