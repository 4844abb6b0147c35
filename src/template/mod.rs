//! Template engine: placeholders, loop markers and loop expansion.

pub mod expand;
pub mod markers;
pub mod placeholder;

pub use expand::{expand_body_loops, expand_table_loops};
pub use markers::{detect_regions, IssueKind, LoopRegion, RegionScan, TemplateIssue};
pub use placeholder::{
    placeholders_in, rewrite_paragraph, strip_markers, substitute_paragraph, Rewrite,
};

use serde::Serialize;

use crate::model::{Block, Document, TableRow};

/// A loop region found by inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoopSummary {
    /// Loop name
    pub name: String,
    /// Container the loop lives in ("body", "table 1", ...)
    pub container: String,
    /// Number of template rows or blocks
    pub template_len: usize,
}

/// What a template contains, without generating anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TemplateSummary {
    /// Placeholder keys in order of first appearance
    pub placeholders: Vec<String>,
    /// Well-formed loop regions
    pub loops: Vec<LoopSummary>,
    /// Malformed markers
    pub issues: Vec<TemplateIssue>,
}

impl TemplateSummary {
    /// Add the placeholders of a document.
    pub fn add_placeholders(&mut self, document: &Document) {
        document.for_each_paragraph(|paragraph| {
            for key in placeholders_in(&paragraph.plain_text()) {
                if !self.placeholders.contains(&key) {
                    self.placeholders.push(key);
                }
            }
        });
    }

    fn add_scan(&mut self, container: &str, scan: RegionScan) {
        self.loops.extend(scan.regions.iter().map(|r| LoopSummary {
            name: r.name.clone(),
            container: container.to_string(),
            template_len: r.template_len(),
        }));
        self.issues.extend(scan.issues);
    }
}

/// Inspect a main document body: placeholders, table loops and body loops.
pub fn inspect(document: &Document) -> TemplateSummary {
    let mut summary = TemplateSummary::default();
    summary.add_placeholders(document);

    for (index, table) in document.tables().enumerate() {
        let container = format!("table {}", index + 1);
        let texts: Vec<Option<String>> = table
            .content
            .iter()
            .map(|item| item.as_row().map(TableRow::plain_text))
            .collect();
        summary.add_scan(&container, detect_regions(&container, &texts));
    }

    let texts: Vec<Option<String>> = document
        .blocks
        .iter()
        .map(|b| match b {
            Block::Paragraph(p) => Some(p.plain_text()),
            _ => None,
        })
        .collect();
    summary.add_scan("body", detect_regions("body", &texts));
    summary
}
