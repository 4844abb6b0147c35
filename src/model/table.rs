//! Table types.

use super::{Block, Paragraph};
use crate::package::XmlElement;
use serde::{Deserialize, Serialize};

/// A table structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Table properties (`w:tblPr`)
    pub properties: Option<XmlElement>,

    /// Column grid (`w:tblGrid`)
    pub grid: Option<XmlElement>,

    /// Rows and other table-level children, in document order
    pub content: Vec<TableItem>,
}

/// A child of a table after its properties and grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TableItem {
    /// A row the engine may fill and replicate
    Row(TableRow),

    /// Anything else (content controls, custom XML, bookmarks), kept verbatim
    Opaque(XmlElement),
}

impl TableItem {
    /// The row, if this is one.
    pub fn as_row(&self) -> Option<&TableRow> {
        match self {
            TableItem::Row(row) => Some(row),
            TableItem::Opaque(_) => None,
        }
    }
}

impl Table {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table with one single-paragraph cell per value, row by row.
    pub fn from_rows<R, S>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for row in rows {
            table.add_row(TableRow::from_strings(row));
        }
        table
    }

    /// Add a row to the table.
    pub fn add_row(&mut self, row: TableRow) {
        self.content.push(TableItem::Row(row));
    }

    /// Iterate over the rows, skipping opaque children.
    pub fn rows(&self) -> impl Iterator<Item = &TableRow> {
        self.content.iter().filter_map(TableItem::as_row)
    }

    /// Mutable iteration over the rows.
    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut TableRow> {
        self.content.iter_mut().filter_map(|item| match item {
            TableItem::Row(row) => Some(row),
            TableItem::Opaque(_) => None,
        })
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows().count()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Get plain text representation of the table, one line per row.
    pub fn plain_text(&self) -> String {
        self.rows()
            .map(|row| row.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A table row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    /// Attributes on the row element itself
    pub attributes: Vec<(String, String)>,

    /// Table property exceptions (`w:tblPrEx`)
    pub exceptions: Option<XmlElement>,

    /// Row properties (`w:trPr`)
    pub properties: Option<XmlElement>,

    /// Cells and other row-level children, in document order
    pub content: Vec<RowItem>,
}

/// A child of a row after its properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RowItem {
    /// A cell whose paragraphs are filled
    Cell(TableCell),

    /// Anything else (content-control wrapped cells, bookmarks), kept verbatim
    Opaque(XmlElement),
}

impl RowItem {
    /// The cell, if this is one.
    pub fn as_cell(&self) -> Option<&TableCell> {
        match self {
            RowItem::Cell(cell) => Some(cell),
            RowItem::Opaque(_) => None,
        }
    }
}

impl TableRow {
    /// Create a new row with cells.
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self {
            content: cells.into_iter().map(RowItem::Cell).collect(),
            ..Self::default()
        }
    }

    /// Create a row from text values.
    pub fn from_strings<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::new(values.into_iter().map(TableCell::text).collect())
    }

    /// Iterate over the cells, skipping opaque children.
    pub fn cells(&self) -> impl Iterator<Item = &TableCell> {
        self.content.iter().filter_map(RowItem::as_cell)
    }

    /// Mutable iteration over the cells.
    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut TableCell> {
        self.content.iter_mut().filter_map(|item| match item {
            RowItem::Cell(cell) => Some(cell),
            RowItem::Opaque(_) => None,
        })
    }

    /// Concatenated text of every cell, as used for marker detection.
    pub fn plain_text(&self) -> String {
        self.cells().map(|c| c.plain_text()).collect()
    }

    /// Iterate over every paragraph in the row's cells.
    pub fn paragraphs_mut(&mut self) -> impl Iterator<Item = &mut Paragraph> {
        self.cells_mut().flat_map(|c| c.paragraphs_mut())
    }
}

/// A table cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    /// Cell properties (`w:tcPr`)
    pub properties: Option<XmlElement>,

    /// Cell content: paragraphs, plus opaque blocks such as nested tables
    pub content: Vec<Block>,
}

impl TableCell {
    /// Create a new cell with text content.
    pub fn text(text: impl Into<String>) -> Self {
        Self::with_content(vec![Block::Paragraph(Paragraph::with_text(text))])
    }

    /// Create an empty cell.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a cell with the given blocks.
    pub fn with_content(content: Vec<Block>) -> Self {
        Self {
            properties: None,
            content,
        }
    }

    /// Get plain text content.
    pub fn plain_text(&self) -> String {
        self.content
            .iter()
            .filter_map(Block::as_paragraph)
            .map(|p| p.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Iterate over the cell's paragraphs.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.content.iter().filter_map(Block::as_paragraph)
    }

    /// Mutable iteration over the cell's paragraphs.
    pub fn paragraphs_mut(&mut self) -> impl Iterator<Item = &mut Paragraph> {
        self.content.iter_mut().filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            _ => None,
        })
    }

    /// Check if the cell is empty.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty() || self.plain_text().trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_new() {
        let table = Table::new();
        assert!(table.is_empty());
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_table_with_data() {
        let table = Table::from_rows([["Name", "Age"], ["Alice", "30"], ["Bob", "25"]]);

        assert_eq!(table.row_count(), 3);
        assert_eq!(table.rows().nth(1).unwrap().plain_text(), "Alice30");
        assert_eq!(table.plain_text(), "NameAge\nAlice30\nBob25");
    }

    #[test]
    fn test_opaque_children_skipped_by_row_views() {
        let mut table = Table::from_rows([["a"]]);
        table.content.push(TableItem::Opaque(XmlElement::new("w:sdt")));
        table.add_row(TableRow::from_strings(["b"]));

        assert_eq!(table.content.len(), 3);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.plain_text(), "a\nb");

        let mut row = TableRow::from_strings(["x", "y"]);
        row.content.insert(1, RowItem::Opaque(XmlElement::new("w:bookmarkStart")));
        assert_eq!(row.cells().count(), 2);
        assert_eq!(row.plain_text(), "xy");
    }

    #[test]
    fn test_cell_text() {
        let cell = TableCell::text("Hello");
        assert_eq!(cell.plain_text(), "Hello");
        assert!(!cell.is_empty());
        assert!(TableCell::empty().is_empty());
    }
}
