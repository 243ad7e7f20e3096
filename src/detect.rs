//! Workbook format detection.

use crate::container::decode_xml_bytes;
use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

/// ZIP file magic bytes: PK\x03\x04
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// OLE compound file magic bytes, used by legacy .xls and encrypted workbooks.
const OLE_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Content type of a regular workbook part.
const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";

/// Content type of a workbook template part.
const XLTX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.template.main+xml";

/// Content type of a macro-enabled workbook part.
const XLSM_CONTENT_TYPE: &str = "application/vnd.ms-excel.sheet.macroEnabled.main+xml";

/// Content types of other Office packages that are not workbooks.
const FOREIGN_CONTENT_TYPES: [(&str, &str); 2] = [
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml",
        "Word document",
    ),
    (
        "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml",
        "PowerPoint presentation",
    ),
];

/// Detected workbook flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkbookFormat {
    /// Regular workbook (.xlsx)
    Xlsx,
    /// Macro-enabled workbook (.xlsm)
    Xlsm,
    /// Workbook template (.xltx)
    Xltx,
}

impl WorkbookFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            WorkbookFormat::Xlsx => "xlsx",
            WorkbookFormat::Xlsm => "xlsm",
            WorkbookFormat::Xltx => "xltx",
        }
    }

    /// Returns a human-readable name for this format.
    pub fn name(&self) -> &'static str {
        match self {
            WorkbookFormat::Xlsx => "Excel Workbook",
            WorkbookFormat::Xlsm => "Excel Macro-Enabled Workbook",
            WorkbookFormat::Xltx => "Excel Template",
        }
    }
}

impl std::fmt::Display for WorkbookFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Detect the workbook format of a file.
pub fn detect_format_from_path(path: impl AsRef<Path>) -> Result<WorkbookFormat> {
    let mut file = BufReader::new(File::open(path.as_ref())?);
    let mut magic = [0u8; 8];
    let read = file.read(&mut magic)?;
    check_magic(&magic[..read])?;
    file.rewind()?;
    detect_format_from_reader(file)
}

/// Detect the workbook format of in-memory data.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<WorkbookFormat> {
    check_magic(data)?;
    detect_format_from_reader(std::io::Cursor::new(data))
}

fn check_magic(data: &[u8]) -> Result<()> {
    if is_ole_file(data) {
        return Err(Error::UnsupportedFormat(
            "OLE compound file (legacy .xls or encrypted workbook)".to_string(),
        ));
    }
    if !is_zip_file(data) {
        return Err(Error::UnknownFormat);
    }
    Ok(())
}

/// Detect the workbook format from a ZIP reader.
pub fn detect_format_from_reader<R: Read + Seek>(reader: R) -> Result<WorkbookFormat> {
    let mut archive = zip::ZipArchive::new(reader)?;

    let content_types = match archive.by_name("[Content_Types].xml") {
        Ok(mut file) => {
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes)?;
            decode_xml_bytes(&bytes)?
        }
        Err(_) => return Err(Error::MissingComponent("[Content_Types].xml".to_string())),
    };

    if content_types.contains(XLSX_CONTENT_TYPE) {
        return Ok(WorkbookFormat::Xlsx);
    }
    if content_types.contains(XLSM_CONTENT_TYPE) {
        return Ok(WorkbookFormat::Xlsm);
    }
    if content_types.contains(XLTX_CONTENT_TYPE) {
        return Ok(WorkbookFormat::Xltx);
    }
    if let Some((_, name)) = FOREIGN_CONTENT_TYPES
        .iter()
        .find(|(content_type, _)| content_types.contains(content_type))
    {
        return Err(Error::UnsupportedFormat(name.to_string()));
    }

    // Some writers leave the content types incomplete.
    if archive.file_names().any(|n| n.starts_with("xl/")) {
        Ok(WorkbookFormat::Xlsx)
    } else {
        Err(Error::UnknownFormat)
    }
}

/// Check if data starts with ZIP magic bytes.
pub fn is_zip_file(data: &[u8]) -> bool {
    data.starts_with(&ZIP_MAGIC)
}

/// Check if data starts with OLE compound file magic bytes.
pub fn is_ole_file(data: &[u8]) -> bool {
    data.starts_with(&OLE_MAGIC)
}
