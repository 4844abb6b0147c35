//! DOCX package adapter.
//!
//! A package is held as its ordered list of zip parts. Only the parts the
//! generator rewrites (the main document, headers, footers and settings)
//! are ever parsed; everything else is written back byte-for-byte.

pub mod protection;
mod reader;
mod writer;
pub mod xml;

pub use xml::{XmlElement, XmlNode};

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{Error, Result};
use crate::model::Document;

/// Fallback location of the main document part.
pub const MAIN_DOCUMENT_PART: &str = "word/document.xml";

/// Fallback location of the settings part.
pub const SETTINGS_PART: &str = "word/settings.xml";

const PACKAGE_RELATIONSHIPS: &str = "_rels/.rels";

const REL_OFFICE_DOCUMENT: &str = "/officeDocument";
const REL_SETTINGS: &str = "/settings";
const REL_HEADER: &str = "/header";
const REL_FOOTER: &str = "/footer";

/// Upper bound on the buffer reserved from an entry's declared size.
const MAX_PART_PREALLOC: usize = 8 * 1024 * 1024;

/// A single named part of the package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// Part name inside the zip (no leading slash)
    pub name: String,
    /// Raw part content
    pub data: Vec<u8>,
}

/// An opened word-processing package.
#[derive(Debug, Clone)]
pub struct DocxPackage {
    parts: Vec<Part>,
}

impl DocxPackage {
    /// Read a package from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(data))
    }

    /// Read a package from a file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    fn from_reader<R: Read + std::io::Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut parts = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            if entry.is_dir() {
                continue;
            }
            let mut data = Vec::with_capacity(prealloc_len(entry.size()));
            entry.read_to_end(&mut data)?;
            parts.push(Part {
                name: entry.name().to_string(),
                data,
            });
        }

        let package = Self { parts };
        let main = package.main_document_name()?;
        if package.part(&main).is_none() {
            return Err(Error::MissingPart(main));
        }
        log::debug!("opened package with {} parts", package.parts.len());
        Ok(package)
    }

    /// Serialize the package back into zip bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for part in &self.parts {
            zip.start_file(part.name.as_str(), options)?;
            zip.write_all(&part.data)?;
        }
        Ok(zip.finish()?.into_inner())
    }

    /// Write the package to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    /// Part names in package order.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|p| p.name.as_str())
    }

    /// Raw content of a part.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.data.as_slice())
    }

    /// Replace a part's content, appending the part if it is new.
    pub fn set_part(&mut self, name: &str, data: Vec<u8>) {
        match self.parts.iter_mut().find(|p| p.name == name) {
            Some(part) => part.data = data,
            None => self.parts.push(Part {
                name: name.to_string(),
                data,
            }),
        }
    }

    /// Name of the main document part.
    pub fn main_document_name(&self) -> Result<String> {
        let targets = self.relationship_targets("", REL_OFFICE_DOCUMENT)?;
        Ok(targets
            .into_iter()
            .next()
            .unwrap_or_else(|| MAIN_DOCUMENT_PART.to_string()))
    }

    /// Name of the settings part, if the package has one.
    pub fn settings_name(&self) -> Result<Option<String>> {
        let main = self.main_document_name()?;
        let name = self
            .relationship_targets(&main, REL_SETTINGS)?
            .into_iter()
            .next()
            .unwrap_or_else(|| SETTINGS_PART.to_string());
        Ok(self.part(&name).map(|_| name))
    }

    /// Header and footer parts referenced by the main document.
    pub fn header_footer_names(&self) -> Result<Vec<String>> {
        let main = self.main_document_name()?;
        let mut names = self.relationship_targets(&main, REL_HEADER)?;
        names.extend(self.relationship_targets(&main, REL_FOOTER)?);

        if names.is_empty() {
            names = self
                .part_names()
                .filter(|n| is_header_footer_part(n))
                .map(str::to_string)
                .collect();
        }
        names.retain(|n| self.part(n).is_some());
        Ok(names)
    }

    /// Parse the main document into a story.
    pub fn main_story(&self) -> Result<Story> {
        let name = self.main_document_name()?;
        self.read_story(&name)
    }

    /// Parse any story part (main document, header or footer).
    pub fn read_story(&self, name: &str) -> Result<Story> {
        let data = self
            .part(name)
            .ok_or_else(|| Error::MissingPart(name.to_string()))?;
        Story::parse(name, data)
    }

    /// Serialize a story back into its part.
    pub fn write_story(&mut self, story: &Story) -> Result<()> {
        let data = story.to_xml()?;
        self.set_part(&story.part, data);
        Ok(())
    }

    /// Targets of the relationships of `source` whose type ends with `type_suffix`.
    ///
    /// An empty `source` addresses the package-level relationships.
    fn relationship_targets(&self, source: &str, type_suffix: &str) -> Result<Vec<String>> {
        let (rels_name, base) = if source.is_empty() {
            (PACKAGE_RELATIONSHIPS.to_string(), "")
        } else {
            let (dir, file) = source.rsplit_once('/').unwrap_or(("", source));
            let rels = if dir.is_empty() {
                format!("_rels/{file}.rels")
            } else {
                format!("{dir}/_rels/{file}.rels")
            };
            (rels, dir)
        };

        let Some(data) = self.part(&rels_name) else {
            return Ok(Vec::new());
        };
        let root = xml::parse(data)?;

        Ok(root
            .elements()
            .filter(|rel| rel.local_name() == "Relationship")
            .filter(|rel| rel.attr("TargetMode") != Some("External"))
            .filter(|rel| rel.attr("Type").is_some_and(|t| t.ends_with(type_suffix)))
            .filter_map(|rel| rel.attr("Target"))
            .map(|target| resolve_target(base, target))
            .collect())
    }
}

fn is_header_footer_part(name: &str) -> bool {
    let Some(file) = name.strip_prefix("word/") else {
        return false;
    };
    !file.contains('/')
        && (file.starts_with("header") || file.starts_with("footer"))
        && file.ends_with(".xml")
}

/// Buffer size to reserve for an entry whose header declares `declared` bytes.
///
/// The header is untrusted; the buffer still grows to the real size.
fn prealloc_len(declared: u64) -> usize {
    usize::try_from(declared).map_or(MAX_PART_PREALLOC, |n| n.min(MAX_PART_PREALLOC))
}

/// Resolve a relationship target against the source part's directory.
fn resolve_target(base: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

/// Which kind of part a story came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryKind {
    /// The main document; content lives in `w:body`
    Body,
    /// A header or footer; content lives directly under the root
    HeaderFooter,
}

/// A parsed story part: the document model plus the XML shell around it.
#[derive(Debug, Clone)]
pub struct Story {
    part: String,
    kind: StoryKind,
    shell: XmlElement,
    /// The editable content
    pub document: Document,
}

impl Story {
    /// Parse a story part.
    pub fn parse(part: &str, data: &[u8]) -> Result<Self> {
        let mut shell = xml::parse(data)?;
        let kind = if shell.local_name() == "document" {
            StoryKind::Body
        } else {
            StoryKind::HeaderFooter
        };

        let container = match kind {
            StoryKind::Body => shell
                .child_mut("w:body")
                .ok_or_else(|| Error::Xml(format!("{part}: document has no body")))?,
            StoryKind::HeaderFooter => &mut shell,
        };
        let blocks = reader::read_blocks(std::mem::take(&mut container.children));

        Ok(Self {
            part: part.to_string(),
            kind,
            shell,
            document: Document::from_blocks(blocks),
        })
    }

    /// Name of the part this story was read from.
    pub fn part_name(&self) -> &str {
        &self.part
    }

    /// Story kind.
    pub fn kind(&self) -> StoryKind {
        self.kind
    }

    /// Serialize the story to part XML.
    pub fn to_xml(&self) -> Result<Vec<u8>> {
        let mut root = self.shell.clone();
        let container = match self.kind {
            StoryKind::Body => root
                .child_mut("w:body")
                .ok_or_else(|| Error::Xml(format!("{}: document has no body", self.part)))?,
            StoryKind::HeaderFooter => &mut root,
        };
        container.children = writer::write_blocks(&self.document.blocks);
        xml::write(&root)
    }
}
