//! Error types for the xldump library.

use std::io;
use thiserror::Error;

/// Result type alias for xldump operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while inspecting a workbook.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error while reading an archive entry.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The archive could not be opened or is not a valid ZIP container.
    #[error("Archive error: {0}")]
    Archive(String),

    /// Error parsing XML content.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// A named archive entry is missing.
    #[error("Missing component: {0}")]
    MissingComponent(String),

    /// A cell referenced a shared string past the end of the table.
    #[error("Shared string index {index} out of range (table has {len} entries)")]
    SharedStringIndex { index: String, len: usize },

    /// Error during rendering.
    #[error("Render error: {0}")]
    Render(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::Archive(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlParse(err.to_string())
    }
}
