//! Document model → XML tree.

use crate::model::{
    Block, Inline, Paragraph, RowItem, Run, Table, TableCell, TableItem, TableRow,
};

use super::xml::{XmlElement, XmlNode};

/// Convert blocks back into container children.
pub(crate) fn write_blocks(blocks: &[Block]) -> Vec<XmlNode> {
    blocks.iter().map(|b| XmlNode::Element(write_block(b))).collect()
}

fn write_block(block: &Block) -> XmlElement {
    match block {
        Block::Paragraph(p) => write_paragraph(p),
        Block::Table(t) => write_table(t),
        Block::Opaque(e) => e.clone(),
    }
}

fn write_paragraph(paragraph: &Paragraph) -> XmlElement {
    let mut element = XmlElement::new("w:p");
    element.attributes = paragraph.attributes.clone();
    if let Some(props) = &paragraph.properties {
        element.children.push(XmlNode::Element(props.clone()));
    }
    element.children.extend(write_inlines(&paragraph.content));
    element
}

fn write_inlines(content: &[Inline]) -> impl Iterator<Item = XmlNode> + '_ {
    content.iter().map(|inline| {
        XmlNode::Element(match inline {
            Inline::Run(run) => write_run(run),
            Inline::Group { element, content } => {
                let mut group = element.clone();
                group.children = write_inlines(content).collect();
                group
            }
            Inline::Opaque(e) => e.clone(),
        })
    })
}

fn write_run(run: &Run) -> XmlElement {
    let mut element = XmlElement::new("w:r");
    element.attributes = run.attributes.clone();
    if let Some(props) = &run.properties {
        element.children.push(XmlNode::Element(props.clone()));
    }

    let mut pending = String::new();
    for ch in run.text.chars() {
        match ch {
            '\t' | '\n' => {
                flush_text(&mut element, &mut pending);
                let name = if ch == '\t' { "w:tab" } else { "w:br" };
                element.children.push(XmlNode::Element(XmlElement::new(name)));
            }
            _ => pending.push(ch),
        }
    }
    flush_text(&mut element, &mut pending);
    element
}

fn flush_text(run: &mut XmlElement, pending: &mut String) {
    if pending.is_empty() {
        return;
    }
    let text = XmlElement::new("w:t")
        .with_attr("xml:space", "preserve")
        .with_text(std::mem::take(pending));
    run.children.push(XmlNode::Element(text));
}

fn write_table(table: &Table) -> XmlElement {
    let mut element = XmlElement::new("w:tbl");
    push_opt(&mut element, &table.properties);
    push_opt(&mut element, &table.grid);
    for item in &table.content {
        let child = match item {
            TableItem::Row(row) => write_row(row),
            TableItem::Opaque(e) => e.clone(),
        };
        element.children.push(XmlNode::Element(child));
    }
    element
}

fn write_row(row: &TableRow) -> XmlElement {
    let mut element = XmlElement::new("w:tr");
    element.attributes = row.attributes.clone();
    push_opt(&mut element, &row.exceptions);
    push_opt(&mut element, &row.properties);
    for item in &row.content {
        let child = match item {
            RowItem::Cell(cell) => write_cell(cell),
            RowItem::Opaque(e) => e.clone(),
        };
        element.children.push(XmlNode::Element(child));
    }
    element
}

fn write_cell(cell: &TableCell) -> XmlElement {
    let mut element = XmlElement::new("w:tc");
    push_opt(&mut element, &cell.properties);
    element.children.extend(write_blocks(&cell.content));
    // A cell must end with a paragraph.
    if !matches!(cell.content.last(), Some(Block::Paragraph(_))) {
        element.children.push(XmlNode::Element(XmlElement::new("w:p")));
    }
    element
}

fn push_opt(parent: &mut XmlElement, child: &Option<XmlElement>) {
    if let Some(child) = child {
        parent.children.push(XmlNode::Element(child.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::reader::read_blocks;
    use crate::package::xml;

    fn names(element: &XmlElement) -> Vec<&str> {
        element.elements().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_run_text_splits_tabs_and_breaks() {
        let element = write_run(&Run::new("a\tb\nc"));
        let names: Vec<_> = element.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["w:t", "w:tab", "w:t", "w:br", "w:t"]);
    }

    #[test]
    fn test_empty_run_has_no_text_element() {
        let element = write_run(&Run::new(""));
        assert!(element.children.is_empty());
    }

    #[test]
    fn test_model_round_trip() {
        let blocks = vec![
            Block::Paragraph(Paragraph::from_runs(["Hello ", "world"])),
            Block::Table(Table::from_rows([["a", "b"], ["c", "d"]])),
        ];
        let reread = read_blocks(write_blocks(&blocks));
        assert_eq!(reread, blocks);
    }

    #[test]
    fn test_content_control_row_written_in_place() {
        let source = r#"<w:body><w:tbl><w:tblPr/><w:tblGrid/><w:tr><w:tc><w:p/></w:tc></w:tr><w:sdt><w:sdtContent><w:tr><w:tc><w:p/></w:tc></w:tr></w:sdtContent></w:sdt><w:tr><w:tc><w:p/></w:tc></w:tr></w:tbl></w:body>"#;
        let blocks = read_blocks(xml::parse(source.as_bytes()).unwrap().children);
        let written = write_table(blocks[0].as_table().unwrap());
        assert_eq!(names(&written), vec!["w:tblPr", "w:tblGrid", "w:tr", "w:sdt", "w:tr"]);
    }

    #[test]
    fn test_content_control_cell_written_in_place() {
        let mut row = TableRow::from_strings(["a"]);
        row.content.push(RowItem::Opaque(XmlElement::new("w:sdt")));
        row.content.push(RowItem::Cell(TableCell::text("b")));
        assert_eq!(names(&write_row(&row)), vec!["w:tc", "w:sdt", "w:tc"]);
    }

    #[test]
    fn test_hyperlink_group_round_trip() {
        let source = r#"<w:body><w:p><w:r><w:t>See </w:t></w:r><w:hyperlink r:id="rId5" w:history="1"><w:r><w:rPr><w:u w:val="single"/></w:rPr><w:t>{{Name}}</w:t></w:r></w:hyperlink></w:p></w:body>"#;
        let mut blocks = read_blocks(xml::parse(source.as_bytes()).unwrap().children);
        if let Block::Paragraph(p) = &mut blocks[0] {
            p.runs_mut().nth(1).unwrap().text = "Bob".to_string();
        }

        let written = write_block(&blocks[0]);
        assert_eq!(names(&written), vec!["w:r", "w:hyperlink"]);
        let link = written.child("w:hyperlink").unwrap();
        assert_eq!(link.attr("r:id"), Some("rId5"));
        assert_eq!(link.attr("w:history"), Some("1"));
        assert_eq!(link.text_content(), "Bob");
        assert!(link.child("w:r").unwrap().child("w:rPr").is_some());
    }

    #[test]
    fn test_empty_cell_gets_paragraph() {
        let element = write_cell(&TableCell::empty());
        assert_eq!(element.elements().last().unwrap().name, "w:p");
    }
}
