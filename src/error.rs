//! Error types for the docfill library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for docfill operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading, filling or saving a template.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not a word-processing package.
    #[error("Unknown file format: not a valid DOCX package")]
    UnknownFormat,

    /// A part the package must contain is missing.
    #[error("Missing package part: {0}")]
    MissingPart(String),

    /// Error reading or writing the zip container.
    #[error("Package container error: {0}")]
    Zip(String),

    /// Error parsing or writing XML.
    #[error("XML error: {0}")]
    Xml(String),

    /// The template could not be read. Nothing was generated.
    #[error("Template unavailable: {path}: {source}")]
    TemplateUnavailable {
        /// Template location
        path: PathBuf,
        /// Underlying cause
        #[source]
        source: io::Error,
    },

    /// Loop markers are malformed (only raised in strict mode).
    #[error("Malformed template in {container}: {detail}")]
    MalformedTemplate {
        /// Where the markers were found ("body", "table 2", ...)
        container: String,
        /// Description of the problem
        detail: String,
    },

    /// Record data could not be interpreted.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Read-only protection could not be applied.
    #[error("Protection error: {0}")]
    Protection(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            zip::result::ZipError::InvalidArchive(_) => Error::UnknownFormat,
            _ => Error::Zip(err.to_string()),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidData(err.to_string())
    }
}
