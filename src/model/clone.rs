//! Structural cloning of template content.
//!
//! A structural clone is a fresh element that receives a copy of the
//! source's formatting and content at every level, sharing nothing with
//! the source. Identity that must stay unique inside a package is not
//! copied: paragraph/row identifiers (`w14:paraId`, `w14:textId`) and
//! bookmark start/end markers.

use super::{Block, Document, Inline, Paragraph, Run, RowItem, Table, TableCell, TableItem, TableRow};
use crate::package::XmlElement;

/// Attributes that identify one specific element inside a package.
const IDENTITY_ATTRIBUTES: &[&str] = &["w14:paraId", "w14:textId"];

/// Elements that name a unique anchor and must not be duplicated.
const ANCHOR_ELEMENTS: &[&str] = &["w:bookmarkStart", "w:bookmarkEnd"];

/// Deep copy used when replicating template content.
pub trait StructuralClone {
    /// Produce an independent copy suitable for insertion next to the source.
    fn structural_clone(&self) -> Self;
}

fn copy_attributes(source: &[(String, String)]) -> Vec<(String, String)> {
    source
        .iter()
        .filter(|(k, _)| !IDENTITY_ATTRIBUTES.contains(&k.as_str()))
        .cloned()
        .collect()
}

fn is_anchor(element: &XmlElement) -> bool {
    ANCHOR_ELEMENTS.contains(&element.name.as_str())
}

impl StructuralClone for Run {
    fn structural_clone(&self) -> Self {
        let mut run = Run::new(self.text.clone());
        run.properties = self.properties.clone();
        run.attributes = copy_attributes(&self.attributes);
        run
    }
}

impl StructuralClone for Paragraph {
    fn structural_clone(&self) -> Self {
        let mut paragraph = Paragraph::new();
        paragraph.properties = self.properties.clone();
        paragraph.attributes = copy_attributes(&self.attributes);
        paragraph.content = clone_inlines(&self.content);
        paragraph
    }
}

fn clone_inlines(items: &[Inline]) -> Vec<Inline> {
    items
        .iter()
        .filter_map(|inline| match inline {
            Inline::Run(run) => Some(Inline::Run(run.structural_clone())),
            Inline::Group { element, content } => Some(Inline::Group {
                element: element.clone(),
                content: clone_inlines(content),
            }),
            Inline::Opaque(element) if is_anchor(element) => None,
            Inline::Opaque(element) => Some(Inline::Opaque(element.clone())),
        })
        .collect()
}

impl StructuralClone for TableCell {
    fn structural_clone(&self) -> Self {
        let mut cell = TableCell::empty();
        cell.properties = self.properties.clone();
        cell.content = clone_blocks(&self.content);
        cell
    }
}

impl StructuralClone for TableRow {
    fn structural_clone(&self) -> Self {
        let mut row = TableRow::new(Vec::new());
        row.attributes = copy_attributes(&self.attributes);
        row.exceptions = self.exceptions.clone();
        row.properties = self.properties.clone();
        row.content = self
            .content
            .iter()
            .filter_map(|item| match item {
                RowItem::Cell(cell) => Some(RowItem::Cell(cell.structural_clone())),
                RowItem::Opaque(e) if is_anchor(e) => None,
                RowItem::Opaque(e) => Some(RowItem::Opaque(e.clone())),
            })
            .collect();
        row
    }
}

impl StructuralClone for Table {
    fn structural_clone(&self) -> Self {
        let mut table = Table::new();
        table.properties = self.properties.clone();
        table.grid = self.grid.clone();
        table.content = clone_table_items(&self.content);
        table
    }
}

/// Clone table children, dropping unique anchors between rows.
pub(crate) fn clone_table_items<'a>(
    items: impl IntoIterator<Item = &'a TableItem>,
) -> Vec<TableItem> {
    items
        .into_iter()
        .filter_map(|item| match item {
            TableItem::Row(row) => Some(TableItem::Row(row.structural_clone())),
            TableItem::Opaque(e) if is_anchor(e) => None,
            TableItem::Opaque(e) => Some(TableItem::Opaque(e.clone())),
        })
        .collect()
}

impl StructuralClone for Block {
    fn structural_clone(&self) -> Self {
        match self {
            Block::Paragraph(p) => Block::Paragraph(p.structural_clone()),
            Block::Table(t) => Block::Table(t.structural_clone()),
            Block::Opaque(e) => Block::Opaque(e.clone()),
        }
    }
}

impl StructuralClone for Document {
    fn structural_clone(&self) -> Self {
        Document::from_blocks(clone_blocks(&self.blocks))
    }
}

fn clone_blocks(blocks: &[Block]) -> Vec<Block> {
    blocks
        .iter()
        .filter(|b| !matches!(b, Block::Opaque(e) if is_anchor(e)))
        .map(StructuralClone::structural_clone)
        .collect()
}
