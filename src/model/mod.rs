//! Document model types for word-processing templates.
//!
//! This module defines the tree the template engine rewrites: an ordered
//! sequence of blocks (paragraphs and tables) whose text lives in styled
//! runs. Formatting is carried as opaque property elements so the engine
//! can copy it without interpreting it.

mod clone;
mod document;
mod paragraph;
mod table;

pub use clone::StructuralClone;
pub(crate) use clone::clone_table_items;
pub use document::{Block, Document};
pub use paragraph::{Inline, Paragraph, Run};
pub use table::{RowItem, Table, TableCell, TableItem, TableRow};
