//! Flattens a parsed `.docx` document into an ordered stream of blocks
//! (spec.md §4.2 step 1).
use docx_rs::{Docx, DocumentChild, ParagraphChild, RunChild, TableCellContent, TableChild, TableRowChild};

/// A paragraph or a table, in document order.
#[derive(Debug, Clone)]
pub enum Block {
    Paragraph { text: String, bold: bool },
    Table { rows: Vec<Vec<String>> },
}

/// Walks the document tree and returns its top-level blocks in order.
///
/// Nested tables inside table cells are not recursed into: spec.md §4.2 only
/// asks for "tables (two-dimensional arrays of cell strings)" at the block
/// level that the heading/specification detection operates over.
pub fn flatten(docx: &Docx) -> Vec<Block> {
    docx.document.children.iter().filter_map(block_from_document_child).collect()
}

fn block_from_document_child(child: &DocumentChild) -> Option<Block> {
    match child {
        DocumentChild::Paragraph(paragraph) => Some(paragraph_block(paragraph)),
        DocumentChild::Table(table) => Some(table_block(table)),
        _ => None,
    }
}

fn paragraph_block(paragraph: &docx_rs::Paragraph) -> Block {
    let mut text = String::new();
    let mut bold = false;

    for child in &paragraph.children {
        if let ParagraphChild::Run(run) = child {
            if run.run_property.bold.is_some() {
                bold = true;
            }
            for run_child in &run.children {
                if let RunChild::Text(t) = run_child {
                    text.push_str(&t.text);
                }
            }
        }
    }

    Block::Paragraph { text, bold }
}

fn table_block(table: &docx_rs::Table) -> Block {
    let mut rows = Vec::new();
    for row_child in &table.rows {
        let TableChild::TableRow(row) = row_child;
        let mut cells = Vec::new();
        for cell_child in &row.cells {
            let TableRowChild::TableCell(cell) = cell_child;
            cells.push(cell_text(cell));
        }
        rows.push(cells);
    }
    Block::Table { rows }
}

fn cell_text(cell: &docx_rs::TableCell) -> String {
    let mut text = String::new();
    for content in &cell.children {
        if let TableCellContent::Paragraph(paragraph) = content {
            if let Block::Paragraph { text: paragraph_text, .. } = paragraph_block(paragraph) {
                if !text.is_empty() && !paragraph_text.is_empty() {
                    text.push(' ');
                }
                text.push_str(&paragraph_text);
            }
        }
    }
    text
}

impl Block {
    pub fn text_len(&self) -> usize {
        match self {
            Block::Paragraph { text, .. } => text.trim().chars().count(),
            Block::Table { .. } => 0,
        }
    }

    pub fn is_blank_paragraph(&self) -> bool {
        matches!(self, Block::Paragraph { text, .. } if text.trim().is_empty())
    }
}
