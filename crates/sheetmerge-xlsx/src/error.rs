//! XLSX error types

use thiserror::Error;

/// Result type for XLSX operations
pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

/// Reasons a container cannot be decoded or encoded
///
/// Only problems that make a whole file unusable are errors. Damage the
/// reader can work around, such as a cell pointing at a style that does not
/// exist, is logged and skipped.
#[derive(Debug, Error)]
pub enum XlsxError {
    /// Reading or writing the underlying file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The bytes are not a readable zip archive
    #[error("not a valid zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A part holds malformed XML
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The archive is a zip, but not a spreadsheet
    #[error("not an XLSX workbook: {0}")]
    InvalidFormat(String),

    /// A part the workbook cannot be read without is absent
    #[error("workbook part missing: {0}")]
    MissingPart(String),

    /// A cell refers to a shared string that does not exist
    #[error("bad shared string reference '{0}'")]
    BadSharedString(String),

    /// Decoded content broke a workbook rule (bad or duplicate sheet name, ...)
    #[error("invalid workbook content: {0}")]
    Core(#[from] sheetmerge_core::Error),
}
