//! Helpers for building template packages in memory.

#![allow(dead_code)]

use std::io::{Cursor, Write};

use docfill::model::{Block, Document, Table};
use docfill::DocxPackage;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// A paragraph with one run per fragment.
pub fn paragraph(fragments: &[&str]) -> String {
    let runs: String = fragments
        .iter()
        .map(|f| format!(r#"<w:r><w:t xml:space="preserve">{f}</w:t></w:r>"#))
        .collect();
    format!("<w:p>{runs}</w:p>")
}

/// A paragraph whose runs carry bold formatting.
pub fn bold_paragraph(text: &str) -> String {
    format!(r#"<w:p><w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">{text}</w:t></w:r></w:p>"#)
}

/// A table row with one single-paragraph cell per value.
pub fn row(cells: &[&str]) -> String {
    let cells: String = cells
        .iter()
        .map(|c| format!("<w:tc><w:tcPr><w:tcW w:w=\"2000\"/></w:tcPr>{}</w:tc>", paragraph(&[c])))
        .collect();
    format!("<w:tr>{cells}</w:tr>")
}

/// A table built from rows of cell text.
pub fn table(rows: &[&[&str]]) -> String {
    let columns = rows.first().map_or(0, |r| r.len());
    let grid: String = (0..columns).map(|_| r#"<w:gridCol w:w="2000"/>"#).collect();
    let rows: String = rows.iter().map(|r| row(r)).collect();
    format!(r#"<w:tbl><w:tblPr><w:tblW w:w="0" w:type="auto"/></w:tblPr><w:tblGrid>{grid}</w:tblGrid>{rows}</w:tbl>"#)
}

/// Template package builder.
#[derive(Default)]
pub struct TemplateBuilder {
    body: String,
    header: Option<String>,
    settings: Option<String>,
}

impl TemplateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(mut self, xml: &str) -> Self {
        self.body.push_str(xml);
        self
    }

    pub fn header(mut self, xml: &str) -> Self {
        self.header = Some(xml.to_string());
        self
    }

    /// Add a settings part with the given children.
    pub fn settings(mut self, children: &str) -> Self {
        self.settings = Some(children.to_string());
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut parts: Vec<(String, String)> = Vec::new();
        let mut overrides = vec![(
            "/word/document.xml",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml",
        )];
        let mut document_rels = String::new();

        if self.settings.is_some() {
            overrides.push((
                "/word/settings.xml",
                "application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml",
            ));
            document_rels.push_str(&format!(
                r#"<Relationship Id="rId1" Type="{REL_NS}/settings" Target="settings.xml"/>"#
            ));
        }
        if self.header.is_some() {
            overrides.push((
                "/word/header1.xml",
                "application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml",
            ));
            document_rels.push_str(&format!(
                r#"<Relationship Id="rId2" Type="{REL_NS}/header" Target="header1.xml"/>"#
            ));
        }

        let overrides: String = overrides
            .iter()
            .map(|(part, ty)| format!(r#"<Override PartName="{part}" ContentType="{ty}"/>"#))
            .collect();
        parts.push((
            "[Content_Types].xml".to_string(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/>{overrides}</Types>"#
            ),
        ));
        parts.push((
            "_rels/.rels".to_string(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{REL_NS}/officeDocument" Target="word/document.xml"/></Relationships>"#
            ),
        ));

        let header_ref = if self.header.is_some() {
            r#"<w:headerReference w:type="default" r:id="rId2"/>"#
        } else {
            ""
        };
        parts.push((
            "word/document.xml".to_string(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{W_NS}" xmlns:r="{REL_NS}"><w:body>{}<w:sectPr>{header_ref}<w:pgSz w:w="11906" w:h="16838"/></w:sectPr></w:body></w:document>"#,
                self.body
            ),
        ));
        parts.push((
            "word/_rels/document.xml.rels".to_string(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{document_rels}</Relationships>"#
            ),
        ));

        if let Some(settings) = &self.settings {
            parts.push((
                "word/settings.xml".to_string(),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:settings xmlns:w="{W_NS}">{settings}</w:settings>"#
                ),
            ));
        }
        if let Some(header) = &self.header {
            parts.push((
                "word/header1.xml".to_string(),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:hdr xmlns:w="{W_NS}">{header}</w:hdr>"#
                ),
            ));
        }

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in &parts {
            zip.start_file(name.as_str(), SimpleFileOptions::default())
                .unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }
}

/// Parse the main document of a generated package.
pub fn main_document(bytes: &[u8]) -> Document {
    DocxPackage::from_bytes(bytes)
        .unwrap()
        .main_story()
        .unwrap()
        .document
}

/// Text of a story part other than the main document.
pub fn story_text(bytes: &[u8], part: &str) -> String {
    DocxPackage::from_bytes(bytes)
        .unwrap()
        .read_story(part)
        .unwrap()
        .document
        .plain_text()
}

/// Raw text of a package part.
pub fn part_xml(bytes: &[u8], part: &str) -> String {
    let package = DocxPackage::from_bytes(bytes).unwrap();
    String::from_utf8(package.part(part).unwrap().to_vec()).unwrap()
}

/// Text of every paragraph block at the top level of the body.
pub fn body_paragraphs(document: &Document) -> Vec<String> {
    document
        .blocks
        .iter()
        .filter_map(Block::as_paragraph)
        .map(|p| p.plain_text())
        .collect()
}

/// The `index`-th table of the body.
pub fn nth_table(document: &Document, index: usize) -> &Table {
    document.tables().nth(index).unwrap()
}

/// Cell texts of a table, row by row.
pub fn table_cells(table: &Table) -> Vec<Vec<String>> {
    table
        .rows()
        .map(|r| r.cells().map(|c| c.plain_text()).collect())
        .collect()
}
