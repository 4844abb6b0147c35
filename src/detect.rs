//! DOCX format detection and validation.

use crate::error::{Error, Result};
use crate::package::DocxPackage;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// DOCX package information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocxFormat {
    /// Name of the main document part (e.g., "word/document.xml")
    pub main_part: String,
    /// Number of parts in the package
    pub part_count: usize,
    /// Whether the package carries a settings part
    pub has_settings: bool,
}

impl std::fmt::Display for DocxFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DOCX ({}, {} parts)", self.main_part, self.part_count)
    }
}

/// Zip local file header signature.
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Detect DOCX format from a file path.
///
/// # Arguments
/// * `path` - Path to the DOCX file
///
/// # Returns
/// * `Ok(DocxFormat)` if the file is a word-processing package
/// * `Err(Error::UnknownFormat)` if it is not
///
/// # Example
/// ```no_run
/// use docfill::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("template.docx").unwrap();
/// println!("Main part: {}", format.main_part);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<DocxFormat> {
    let file = File::open(path)?;
    let mut data = Vec::new();
    BufReader::new(file).read_to_end(&mut data)?;
    detect_format_from_bytes(&data)
}

/// Detect DOCX format from bytes.
///
/// The zip signature is checked first, so plain text and other formats
/// are rejected without attempting to open an archive.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<DocxFormat> {
    if !has_zip_magic(data) {
        return Err(Error::UnknownFormat);
    }

    let package = match DocxPackage::from_bytes(data) {
        Ok(package) => package,
        Err(Error::MissingPart(_)) | Err(Error::Zip(_)) => return Err(Error::UnknownFormat),
        Err(e) => return Err(e),
    };

    Ok(DocxFormat {
        main_part: package.main_document_name()?,
        part_count: package.part_names().count(),
        has_settings: package.settings_name()?.is_some(),
    })
}

fn has_zip_magic(data: &[u8]) -> bool {
    data.starts_with(ZIP_MAGIC)
}

/// Check if a file is a DOCX package.
pub fn is_docx<P: AsRef<Path>>(path: P) -> bool {
    detect_format_from_path(path).is_ok()
}

/// Check if bytes hold a DOCX package.
pub fn is_docx_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}
