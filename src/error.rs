//! Error types for the splitsheet library.

use std::io;
use thiserror::Error;

/// Result type alias for splitsheet operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading a workbook or writing records.
///
/// Per-cell problems never show up here: cells that cannot be coerced fall back
/// to their documented defaults inside the normalizer.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file is not a ZIP-based workbook.
    #[error("Unknown file format")]
    UnknownFormat,

    /// The file format is recognized but is not a readable workbook.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Error reading ZIP archive.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// Error parsing XML content.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// A required workbook part is missing.
    #[error("Missing component: {0}")]
    MissingComponent(String),

    /// The requested worksheet does not exist.
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// The workbook declares no worksheets.
    #[error("Workbook contains no sheets")]
    NoSheets,

    /// Error while serializing records.
    #[error("Serialization error: {0}")]
    Serialize(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialize(err.to_string())
    }
}
