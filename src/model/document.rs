//! Document-level types.

use super::{Paragraph, Table};
use crate::package::XmlElement;
use serde::{Deserialize, Serialize};

/// A document body: an ordered sequence of top-level blocks.
///
/// The same type is used for header and footer content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Body elements in document order
    pub blocks: Vec<Block>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document from blocks.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// Append a paragraph.
    pub fn add_paragraph(&mut self, paragraph: Paragraph) {
        self.blocks.push(Block::Paragraph(paragraph));
    }

    /// Append a table.
    pub fn add_table(&mut self, table: Table) {
        self.blocks.push(Block::Table(table));
    }

    /// Number of top-level blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the document has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Top-level paragraphs.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter_map(Block::as_paragraph)
    }

    /// Top-level tables.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(Block::as_table)
    }

    /// Mutable access to top-level tables.
    pub fn tables_mut(&mut self) -> impl Iterator<Item = &mut Table> {
        self.blocks.iter_mut().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }

    /// Visit every paragraph, including those inside table cells.
    pub fn for_each_paragraph_mut(&mut self, mut f: impl FnMut(&mut Paragraph)) {
        for block in &mut self.blocks {
            block.for_each_paragraph_mut(&mut f);
        }
    }

    /// Visit every paragraph immutably, including those inside table cells.
    pub fn for_each_paragraph(&self, mut f: impl FnMut(&Paragraph)) {
        fn walk(blocks: &[Block], f: &mut dyn FnMut(&Paragraph)) {
            for block in blocks {
                match block {
                    Block::Paragraph(p) => f(p),
                    Block::Table(t) => {
                        for cell in t.rows().flat_map(|r| r.cells()) {
                            walk(&cell.content, f);
                        }
                    }
                    Block::Opaque(_) => {}
                }
            }
        }
        walk(&self.blocks, &mut f);
    }

    /// Get plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Paragraph(p) => Some(p.plain_text()),
                Block::Table(t) => Some(t.plain_text()),
                Block::Opaque(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A top-level content block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A paragraph
    Paragraph(Paragraph),

    /// A table
    Table(Table),

    /// Any other body element (section properties, content controls, ...)
    Opaque(XmlElement),
}

impl Block {
    /// The paragraph, if this is one.
    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            Block::Paragraph(p) => Some(p),
            _ => None,
        }
    }

    /// The table, if this is one.
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Block::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Visit every paragraph in this block, including table cells.
    pub fn for_each_paragraph_mut(&mut self, f: &mut dyn FnMut(&mut Paragraph)) {
        match self {
            Block::Paragraph(p) => f(p),
            Block::Table(t) => {
                for cell in t.rows_mut().flat_map(|r| r.cells_mut()) {
                    for block in &mut cell.content {
                        block.for_each_paragraph_mut(f);
                    }
                }
            }
            Block::Opaque(_) => {}
        }
    }
}
