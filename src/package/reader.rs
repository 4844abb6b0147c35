//! XML tree → document model.

use crate::model::{
    Block, Inline, Paragraph, RowItem, Run, Table, TableCell, TableItem, TableRow,
};

use super::xml::{XmlElement, XmlNode};

/// Run children that keep a run rewritable.
const TEXT_RUN_CHILDREN: &[&str] = &[
    "w:rPr",
    "w:t",
    "w:tab",
    "w:cr",
    "w:br",
    "w:lastRenderedPageBreak",
];

/// Inline wrappers whose runs stay rewritable.
const GROUP_ELEMENTS: &[&str] = &["w:hyperlink", "w:smartTag", "w:ins"];

/// Convert the children of a story container (`w:body`, `w:hdr`, `w:ftr`).
pub(crate) fn read_blocks(children: Vec<XmlNode>) -> Vec<Block> {
    children
        .into_iter()
        .filter_map(element_of)
        .map(read_block)
        .collect()
}

fn element_of(node: XmlNode) -> Option<XmlElement> {
    match node {
        XmlNode::Element(e) => Some(e),
        // Inter-element whitespace carries no content in these containers.
        XmlNode::Text(_) => None,
    }
}

fn read_block(element: XmlElement) -> Block {
    match element.name.as_str() {
        "w:p" => Block::Paragraph(read_paragraph(element)),
        "w:tbl" => Block::Table(read_table(element)),
        _ => Block::Opaque(element),
    }
}

pub(crate) fn read_paragraph(element: XmlElement) -> Paragraph {
    let mut paragraph = Paragraph::new();
    paragraph.attributes = element.attributes;

    for child in element.children.into_iter().filter_map(element_of) {
        match child.name.as_str() {
            "w:pPr" => paragraph.properties = Some(child),
            _ => paragraph.content.push(read_inline(child)),
        }
    }
    paragraph
}

fn read_inline(mut element: XmlElement) -> Inline {
    match element.name.as_str() {
        "w:r" if is_text_run(&element) => Inline::Run(read_run(element)),
        name if GROUP_ELEMENTS.contains(&name) => {
            let content = std::mem::take(&mut element.children)
                .into_iter()
                .filter_map(element_of)
                .map(read_inline)
                .collect();
            Inline::Group { element, content }
        }
        _ => Inline::Opaque(element),
    }
}

/// A run is rewritable when it only holds text, tabs and line breaks.
fn is_text_run(element: &XmlElement) -> bool {
    element.elements().all(|child| {
        TEXT_RUN_CHILDREN.contains(&child.name.as_str())
            && (child.name != "w:br"
                || matches!(child.attr("w:type"), None | Some("textWrapping")))
    })
}

fn read_run(element: XmlElement) -> Run {
    let mut run = Run::new(String::new());
    run.attributes = element.attributes;

    for child in element.children.into_iter().filter_map(element_of) {
        match child.name.as_str() {
            "w:rPr" => run.properties = Some(child),
            "w:t" => run.text.push_str(&child.text_content()),
            "w:tab" => run.text.push('\t'),
            "w:br" | "w:cr" => run.text.push('\n'),
            // Layout cache, regenerated by the word processor.
            _ => {}
        }
    }
    run
}

fn read_table(element: XmlElement) -> Table {
    let mut table = Table::new();

    for child in element.children.into_iter().filter_map(element_of) {
        match child.name.as_str() {
            "w:tblPr" => table.properties = Some(child),
            "w:tblGrid" => table.grid = Some(child),
            "w:tr" => table.add_row(read_row(child)),
            _ => table.content.push(TableItem::Opaque(child)),
        }
    }
    table
}

fn read_row(element: XmlElement) -> TableRow {
    let mut row = TableRow::new(Vec::new());
    row.attributes = element.attributes;

    for child in element.children.into_iter().filter_map(element_of) {
        match child.name.as_str() {
            "w:tblPrEx" => row.exceptions = Some(child),
            "w:trPr" => row.properties = Some(child),
            "w:tc" => row.content.push(RowItem::Cell(read_cell(child))),
            _ => row.content.push(RowItem::Opaque(child)),
        }
    }
    row
}

fn read_cell(element: XmlElement) -> TableCell {
    let mut cell = TableCell::empty();

    for child in element.children.into_iter().filter_map(element_of) {
        match child.name.as_str() {
            "w:tcPr" => cell.properties = Some(child),
            "w:p" => cell.content.push(Block::Paragraph(read_paragraph(child))),
            // Nested tables stay opaque.
            _ => cell.content.push(Block::Opaque(child)),
        }
    }
    cell
}
